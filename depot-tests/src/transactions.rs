use crate::{customer::Customer, memory::MemoryServer};
use depot_core::{ConnectionProvider, Options, Repository, TransactionContext};

/// Work done inside a rolled-back transaction leaves the store untouched,
/// observed through a fresh non-transactional connection.
pub async fn rollback_discards(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());
    repository
        .insert(&Customer::new("Ann", "a@x.com"), true, Options::new())
        .await
        .expect("failed to seed the customer");

    let mut context = TransactionContext::new(provider.clone());
    context.begin().await.expect("failed to begin");
    assert!(context.is_active());

    repository
        .insert(
            &Customer::new("Bob", "b@x.com"),
            true,
            Options::in_transaction(&mut context),
        )
        .await
        .expect("failed to insert inside the transaction");
    repository
        .delete(1, Options::in_transaction(&mut context))
        .await
        .expect("failed to delete inside the transaction");
    assert_eq!(server.row_count("Customer"), 1);

    context.rollback().await.expect("failed to roll back");
    assert!(!context.is_active());

    let all = repository
        .get_all(Options::new())
        .await
        .expect("failed to list after rollback");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Ann");
}

/// Committed work persists, and the finalized context can be reused with a
/// fresh begin.
pub async fn commit_persists_and_context_is_reusable(
    provider: &ConnectionProvider,
    server: &MemoryServer,
) {
    let repository = Repository::<Customer>::new(provider.clone());
    let mut context = TransactionContext::new(provider.clone());

    context.begin().await.expect("failed to begin");
    repository
        .insert(
            &Customer::new("Ann", "a@x.com"),
            true,
            Options::in_transaction(&mut context),
        )
        .await
        .expect("failed to insert inside the transaction");
    context.commit().await.expect("failed to commit");
    assert!(!context.is_active());
    assert_eq!(server.row_count("Customer"), 1);

    context.begin().await.expect("failed to begin again");
    repository
        .insert(
            &Customer::new("Bob", "b@x.com"),
            true,
            Options::in_transaction(&mut context),
        )
        .await
        .expect("failed to insert in the second transaction");
    context.commit().await.expect("failed to commit again");
    assert_eq!(server.row_count("Customer"), 2);
}

/// Finalizing an idle context is a no-op, beginning twice keeps the first
/// transaction, and borrowing an idle context never implicitly begins one.
pub async fn context_lifecycle_edges(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());
    let mut context = TransactionContext::new(provider.clone());

    context.commit().await.expect("idle commit should be a no-op");
    context
        .rollback()
        .await
        .expect("idle rollback should be a no-op");
    assert!(!context.is_active());

    // Borrowing opens the connection but starts no transaction.
    let all = repository
        .get_all(Options::in_transaction(&mut context))
        .await
        .expect("failed to list through the idle context");
    assert!(all.is_empty());
    assert!(!context.is_active());
    assert_eq!(server.opened_connections(), 1);

    context.begin().await.expect("failed to begin");
    context.begin().await.expect("redundant begin should be a no-op");
    repository
        .insert(
            &Customer::new("Ann", "a@x.com"),
            true,
            Options::in_transaction(&mut context),
        )
        .await
        .expect("failed to insert inside the transaction");
    context.rollback().await.expect("failed to roll back");
    assert_eq!(server.row_count("Customer"), 0);
}
