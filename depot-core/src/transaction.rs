use crate::{Client, ConnectionProvider, RepositoryError, Result};
use log::debug;

/// A caller-managed unit of work: one lazily opened connection and one
/// transaction, shared by every repository call that borrows this context.
///
/// Lifecycle: `Idle` → [`begin`](Self::begin) → `Active` →
/// [`commit`](Self::commit) / [`rollback`](Self::rollback) → `Idle`. After
/// finalization the connection is closed and released; the context is
/// reusable with a fresh `begin`. Borrowing the context for an operation
/// reopens the connection if needed but never implicitly begins a
/// transaction.
pub struct TransactionContext {
    provider: ConnectionProvider,
    client: Option<Box<dyn Client>>,
    active: bool,
}

impl TransactionContext {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self {
            provider,
            client: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Opens the connection if it is closed and starts a transaction at the
    /// configured isolation level, adjusted for the engine. No-op when a
    /// transaction is already active.
    pub async fn begin(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        self.ensure_open().await?;
        let isolation = self
            .provider
            .engine()
            .effective_isolation(self.provider.config().isolation);
        self.client_mut()?
            .begin(isolation)
            .await
            .map_err(RepositoryError::from)?;
        self.active = true;
        debug!("transaction started at {isolation:?}");
        Ok(())
    }

    /// Commits the active transaction, then closes and releases the
    /// connection. No-op when no transaction is active.
    pub async fn commit(&mut self) -> Result<()> {
        self.finish(true).await
    }

    /// Rolls back the active transaction, then closes and releases the
    /// connection. No-op when no transaction is active.
    pub async fn rollback(&mut self) -> Result<()> {
        self.finish(false).await
    }

    async fn finish(&mut self, commit: bool) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        let client = self
            .client
            .as_deref_mut()
            .ok_or_else(|| RepositoryError::data_access("transaction connection is not open"))?;
        if commit {
            client.commit().await.map_err(RepositoryError::from)?;
        } else {
            client.rollback().await.map_err(RepositoryError::from)?;
        }
        if let Err(error) = client.close().await {
            log::warn!("failed to close the transaction connection: {error:#}");
        }
        self.client = None;
        self.active = false;
        debug!("transaction {}", if commit { "committed" } else { "rolled back" });
        Ok(())
    }

    /// Lazily connects and opens; used by `begin` and by repository calls
    /// that borrow this context.
    pub(crate) async fn ensure_open(&mut self) -> Result<()> {
        if self.client.is_none() {
            let mut client = self.provider.client("transaction")?;
            client.open().await.map_err(RepositoryError::from)?;
            self.client = Some(client);
        }
        Ok(())
    }

    pub(crate) fn client_mut(&mut self) -> Result<&mut (dyn Client + 'static)> {
        self.client
            .as_deref_mut()
            .ok_or_else(|| RepositoryError::data_access("transaction connection is not open"))
    }
}
