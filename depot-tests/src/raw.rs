use crate::{customer::Customer, memory::MemoryServer};
use depot_core::{
    ConnectionProvider, DATASET_COMMAND_TIMEOUT, Options, Repository, RepositoryError, Value,
};
use std::time::Duration;

async fn seed(repository: &Repository<Customer>, names: &[(&str, &str)]) {
    for (name, email) in names {
        repository
            .insert(&Customer::new(name, email), false, Options::new())
            .await
            .expect("failed to seed a customer");
    }
}

/// Caller-supplied scalar and non-query SQL with bound parameters.
pub async fn scalar_and_non_query(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());
    seed(&repository, &[("Ann", "a@x.com"), ("Bob", "b@x.com")]).await;

    let count = repository
        .execute_scalar("SELECT COUNT(*) FROM [Customer]", Vec::new(), Options::new())
        .await
        .expect("the count query failed");
    assert_eq!(count, Some(Value::Int64(2)));

    let affected = repository
        .execute_non_query(
            "DELETE FROM [Customer] WHERE [Name] = @Name",
            vec![provider.parameter("Name", "Bob")],
            Options::new(),
        )
        .await
        .expect("the parameterized delete failed");
    assert_eq!(affected, 1);
    assert_eq!(server.row_count("Customer"), 1);
}

/// The dataset paths fall back to the two-minute command timeout; a per-call
/// timeout overrides it.
pub async fn dataset_timeouts(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());
    seed(&repository, &[("Ann", "a@x.com")]).await;

    let table = repository
        .get_data_set("SELECT * FROM [Customer]", Vec::new(), Options::new())
        .await
        .expect("the dataset query failed");
    assert_eq!(table.len(), 1);
    assert_eq!(server.last_timeout(), Some(DATASET_COMMAND_TIMEOUT));

    let override_timeout = Duration::from_secs(5);
    repository
        .get_data_set(
            "SELECT * FROM [Customer]",
            Vec::new(),
            Options::new().timeout(override_timeout),
        )
        .await
        .expect("the dataset query with an explicit timeout failed");
    assert_eq!(server.last_timeout(), Some(override_timeout));

    // The non-dataset paths carry no fallback.
    repository
        .get_all(Options::new())
        .await
        .expect("the mapped read failed");
    assert_eq!(server.last_timeout(), None);
}

/// The backend has no stored procedures; the failure surfaces as a data
/// access error naming the procedure.
pub async fn procedure_failure_names_the_procedure(provider: &ConnectionProvider) {
    let repository = Repository::<Customer>::new(provider.clone());

    let error = repository
        .execute_procedure("RefreshCustomers", Vec::new(), Options::new())
        .await
        .expect_err("the procedure does not exist");
    assert!(matches!(error, RepositoryError::DataAccess(_)));
    assert!(error.to_string().contains("RefreshCustomers"));

    let error = repository
        .get_procedure_data_set("CustomerReport", Vec::new(), Options::new())
        .await
        .expect_err("the procedure does not exist");
    assert!(error.to_string().contains("CustomerReport"));
}

/// A raw insert with identity retrieval appended by the engine dialect.
pub async fn raw_insert_returns_identity(provider: &ConnectionProvider, server: &MemoryServer) {
    let repository = Repository::<Customer>::new(provider.clone());

    let id = repository
        .execute_insert_returning_identity(
            "INSERT INTO [Customer] ([Name], [Email]) VALUES (@Name, @Email);",
            vec![
                provider.parameter("Name", "Ann"),
                provider.parameter("Email", "a@x.com"),
            ],
            None,
            Options::new(),
        )
        .await
        .expect("the raw identity insert failed");
    assert_eq!(id, 1);
    assert_eq!(server.row_count("Customer"), 1);
}
