use crate::{customer::Customer, memory::MemoryServer};
use depot_core::{
    ConnectionConfig, ConnectionProvider, Engine, Options, Repository, RepositoryError,
};
use std::sync::Arc;

/// The mapped write paths reject Oracle before any connection is opened.
pub async fn oracle_mapped_writes_rejected(server: &MemoryServer) {
    let provider = ConnectionProvider::new(
        ConnectionConfig::new(Engine::Oracle, "memory://oracle"),
        Arc::new(server.clone()),
    );
    let repository = Repository::<Customer>::new(provider);
    let customer = Customer::new("Ann", "a@x.com");

    let error = repository
        .insert(&customer, true, Options::new())
        .await
        .expect_err("Oracle insert must be rejected");
    assert!(matches!(
        error,
        RepositoryError::UnsupportedEngine {
            engine: Engine::Oracle,
            operation: "insert",
        }
    ));

    let error = repository
        .update(&customer, Options::new())
        .await
        .expect_err("Oracle update must be rejected");
    assert!(matches!(
        error,
        RepositoryError::UnsupportedEngine {
            engine: Engine::Oracle,
            operation: "update",
        }
    ));

    assert_eq!(server.opened_connections(), 0);
}

/// A factory with no client for the configured engine surfaces an explicit
/// unsupported-engine error instead of a null capability.
pub async fn unsupported_engine_has_no_client(server: &MemoryServer) {
    let provider = ConnectionProvider::new(
        ConnectionConfig::new(Engine::Postgres, "memory://postgres"),
        Arc::new(server.clone()),
    );
    let repository = Repository::<Customer>::new(provider);

    let error = repository
        .get_all(Options::new())
        .await
        .expect_err("the factory has no Postgres client");
    assert!(matches!(
        error,
        RepositoryError::UnsupportedEngine {
            engine: Engine::Postgres,
            ..
        }
    ));
    assert_eq!(server.opened_connections(), 0);
}
