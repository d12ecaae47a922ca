use depot_tests::{crud, guards, init_logs, memory::MemoryServer, raw, sql_server_fixture, transactions};

#[tokio::test]
async fn crud_round_trip() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    crud::round_trip(&provider, &server).await;
}

#[tokio::test]
async fn crud_reads_are_stable() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    crud::reads_are_stable(&provider, &server).await;
}

#[tokio::test]
async fn crud_narrow_integer_keys_match() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    crud::narrow_integer_keys_match(&provider, &server).await;
}

#[tokio::test]
async fn crud_query_with_parameters() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    crud::query_with_parameters(&provider, &server).await;
}

// Drives the blocking surface, which runs its own runtime and therefore
// must not execute inside an asynchronous test.
#[test]
fn crud_blocking_round_trip() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    crud::blocking_round_trip(&provider, &server);
}

#[tokio::test]
async fn transaction_rollback_discards() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    transactions::rollback_discards(&provider, &server).await;
}

#[tokio::test]
async fn transaction_commit_persists_and_context_is_reusable() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    transactions::commit_persists_and_context_is_reusable(&provider, &server).await;
}

#[tokio::test]
async fn transaction_context_lifecycle_edges() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    transactions::context_lifecycle_edges(&provider, &server).await;
}

#[tokio::test]
async fn oracle_mapped_writes_rejected() {
    init_logs();
    let server = MemoryServer::new();
    guards::oracle_mapped_writes_rejected(&server).await;
}

#[tokio::test]
async fn unsupported_engine_has_no_client() {
    init_logs();
    let server = MemoryServer::new();
    guards::unsupported_engine_has_no_client(&server).await;
}

#[tokio::test]
async fn raw_scalar_and_non_query() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    raw::scalar_and_non_query(&provider, &server).await;
}

#[tokio::test]
async fn raw_dataset_timeouts() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    raw::dataset_timeouts(&provider, &server).await;
}

#[tokio::test]
async fn raw_procedure_failure_names_the_procedure() {
    init_logs();
    let (_server, provider) = sql_server_fixture();
    raw::procedure_failure_names_the_procedure(&provider).await;
}

#[tokio::test]
async fn raw_insert_returns_identity() {
    init_logs();
    let (server, provider) = sql_server_fixture();
    raw::raw_insert_returns_identity(&provider, &server).await;
}
