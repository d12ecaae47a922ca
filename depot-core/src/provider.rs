use crate::{Client, ConnectionConfig, Engine, Parameter, RepositoryError, Result, Value};
use std::sync::Arc;

/// Produces concrete clients for engine kinds. `None` means the engine is
/// not supported by this factory; the provider turns that into an explicit
/// [`RepositoryError::UnsupportedEngine`] instead of handing out a null
/// capability.
pub trait ClientFactory: Send + Sync {
    fn client(&self, engine: Engine, connection_string: &str) -> Option<Box<dyn Client>>;
}

/// Binds a [`ConnectionConfig`] to a [`ClientFactory`] and hands out
/// unopened clients plus engine-specific parameter objects.
#[derive(Clone)]
pub struct ConnectionProvider {
    config: ConnectionConfig,
    factory: Arc<dyn ClientFactory>,
}

impl ConnectionProvider {
    pub fn new(config: ConnectionConfig, factory: Arc<dyn ClientFactory>) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn engine(&self) -> Engine {
        self.config.engine
    }

    /// A fresh, unopened client for the configured engine.
    pub fn client(&self, operation: &'static str) -> Result<Box<dyn Client>> {
        self.factory
            .client(self.config.engine, &self.config.connection_string)
            .ok_or(RepositoryError::UnsupportedEngine {
                engine: self.config.engine,
                operation,
            })
    }

    /// Builds a parameter carrying the raw column name; the engine prefix is
    /// only ever written into SQL text.
    pub fn parameter(&self, name: impl Into<String>, value: impl Into<Value>) -> Parameter {
        Parameter::new(name, value)
    }

    /// The placeholder for a parameter as it appears in this engine's SQL.
    pub fn placeholder(&self, name: &str) -> String {
        self.config.engine.placeholder(name)
    }
}
