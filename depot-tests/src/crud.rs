use crate::{customer::Customer, memory::MemoryServer};
use depot_core::{ConnectionProvider, Options, Repository, blocking};

/// Insert with identity retrieval, read back by id, update, read again,
/// delete, confirm the table is empty.
pub async fn round_trip(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());

    let id = repository
        .insert(&Customer::new("Ann", "a@x.com"), true, Options::new())
        .await
        .expect("failed to insert the customer");
    assert_eq!(id, 1);
    assert_eq!(server.row_count("Customer"), 1);

    let mut fetched = repository
        .get_by_id(id, Options::new())
        .await
        .expect("failed to fetch the customer")
        .expect("the inserted customer is missing");
    assert_eq!(fetched.id, 1);
    assert_eq!(fetched.name, "Ann");
    assert_eq!(fetched.email, "a@x.com");
    assert_eq!(fetched.last_login, None);

    fetched.email = "ann@x.com".into();
    let affected = repository
        .update(&fetched, Options::new())
        .await
        .expect("failed to update the customer");
    assert_eq!(affected, 1);
    let updated = repository
        .get_by_id(id, Options::new())
        .await
        .expect("failed to refetch the customer")
        .expect("the updated customer is missing");
    assert_eq!(updated.email, "ann@x.com");

    let affected = repository
        .delete(id, Options::new())
        .await
        .expect("failed to delete the customer");
    assert_eq!(affected, 1);
    assert!(
        repository
            .get_by_id(id, Options::new())
            .await
            .expect("failed to probe for the deleted customer")
            .is_none()
    );
    assert_eq!(server.row_count("Customer"), 0);
}

/// Repeating a read does not change the result; inserts without identity
/// retrieval report the affected row count instead.
pub async fn reads_are_stable(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());

    for name in ["Ann", "Bob", "Cleo"] {
        let affected = repository
            .insert(&Customer::new(name, "x@x.com"), false, Options::new())
            .await
            .expect("failed to insert a customer");
        assert_eq!(affected, 1);
    }
    assert_eq!(server.row_count("Customer"), 3);

    let first = repository
        .get_all(Options::new())
        .await
        .expect("failed to list the customers");
    let second = repository
        .get_all(Options::new())
        .await
        .expect("failed to list the customers again");
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

/// Key lookups bind whatever integer width the caller passes; the store
/// compares them numerically against the generated 64-bit identities.
pub async fn narrow_integer_keys_match(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());
    repository
        .insert(&Customer::new("Ann", "a@x.com"), true, Options::new())
        .await
        .expect("failed to insert the customer");

    let fetched = repository
        .get_by_id(1_i32, Options::new())
        .await
        .expect("failed to fetch by a 32-bit key")
        .expect("the customer is missing");
    assert_eq!(fetched.id, 1);

    let affected = repository
        .delete(1_i32, Options::new())
        .await
        .expect("failed to delete by a 32-bit key");
    assert_eq!(affected, 1);
    assert_eq!(server.row_count("Customer"), 0);
}

/// Caller-supplied SQL with bound parameters materializes entities.
pub async fn query_with_parameters(provider: &ConnectionProvider, _server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());
    repository
        .insert(&Customer::new("Ann", "a@x.com"), true, Options::new())
        .await
        .expect("failed to insert Ann");
    repository
        .insert(&Customer::new("Bob", "b@x.com"), true, Options::new())
        .await
        .expect("failed to insert Bob");

    let matches = repository
        .query(
            "SELECT * FROM [Customer] WHERE [Name] = @Name",
            vec![provider.parameter("Name", "Bob")],
            Options::new(),
        )
        .await
        .expect("the parameterized query failed");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Bob");
    assert_eq!(matches[0].id, 2);
}

/// The blocking surface mirrors the asynchronous one call for call. Runs on
/// its own runtime, so it must be driven from a plain thread.
pub fn blocking_round_trip(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = blocking::Repository::<Customer>::new(provider.clone());

    let id = repository
        .insert(&Customer::new("Ann", "a@x.com"), true, Options::new())
        .expect("failed to insert the customer");
    assert_eq!(id, 1);

    let fetched = repository
        .get_by_id(id, Options::new())
        .expect("failed to fetch the customer")
        .expect("the inserted customer is missing");
    assert_eq!(fetched.name, "Ann");

    let all = repository
        .get_all(Options::new())
        .expect("failed to list the customers");
    assert_eq!(all.len(), 1);

    repository
        .delete(id, Options::new())
        .expect("failed to delete the customer");
    assert_eq!(server.row_count("Customer"), 0);
}
