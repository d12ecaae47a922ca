use crate::Engine;
use std::time::Duration;

/// Transaction isolation requested when a context begins. Engines that do
/// not support a level may substitute their own, see
/// [`Engine::effective_isolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

/// Connection settings for one backend. Immutable for the lifetime of the
/// repositories and transaction contexts built on top of it.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub connection_string: String,
    pub engine: Engine,
    pub isolation: IsolationLevel,
    /// Applied to every command unless overridden per call. `None` leaves
    /// the client's own default in place.
    pub command_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(engine: Engine, connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            engine,
            isolation: IsolationLevel::default(),
            command_timeout: None,
        }
    }

    pub fn isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }
}
