use crate::{DataTable, IsolationLevel, Statement, Value};
use futures::future::BoxFuture;
use std::time::Duration;

/// The abstract execute/query capability of a database client.
///
/// Everything wire-level (pooling, protocol, network I/O) lives behind this
/// trait; the repository layer only opens, runs statements and closes. A
/// client is exclusively owned by whichever session requested it until
/// closed. Failures cross this boundary as [`anyhow::Error`] and are
/// uniformly re-signaled as data-access errors above it.
pub trait Client: Send {
    /// Opens the physical connection. Idempotent for an already open client.
    fn open(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Closes the physical connection. Called on every exit path of an
    /// owned session.
    fn close(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Runs a statement that returns no rows, yielding the affected count.
    fn execute<'a>(
        &'a mut self,
        statement: &'a Statement,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, anyhow::Result<u64>>;

    /// Runs a statement and materializes the full result set.
    fn fetch<'a>(
        &'a mut self,
        statement: &'a Statement,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, anyhow::Result<DataTable>>;

    /// Runs a statement and yields the first cell of the first row, if any.
    fn fetch_scalar<'a>(
        &'a mut self,
        statement: &'a Statement,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, anyhow::Result<Option<Value>>>;

    /// Starts a transaction on this connection at the given level.
    fn begin(&mut self, isolation: IsolationLevel) -> BoxFuture<'_, anyhow::Result<()>>;

    fn commit(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;

    fn rollback(&mut self) -> BoxFuture<'_, anyhow::Result<()>>;
}
