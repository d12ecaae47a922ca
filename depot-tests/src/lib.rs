pub mod crud;
pub mod customer;
pub mod guards;
pub mod memory;
pub mod raw;
pub mod transactions;

use depot_core::{ConnectionConfig, ConnectionProvider, Engine};
use log::LevelFilter;
use memory::MemoryServer;
use std::{env, sync::Arc};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// A fresh server with a `Customer` table plus a SqlServer provider backed
/// by it. Each scenario runs against its own store.
pub fn sql_server_fixture() -> (MemoryServer, ConnectionProvider) {
    let server = MemoryServer::new();
    server.create_table("Customer", Some("Id"));
    let provider = ConnectionProvider::new(
        ConnectionConfig::new(Engine::SqlServer, "memory://local"),
        Arc::new(server.clone()),
    );
    (server, provider)
}
