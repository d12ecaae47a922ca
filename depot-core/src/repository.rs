use crate::{
    Client, ConnectionProvider, DataTable, Entity, EntityMetadata, Parameter, RepositoryError,
    Result, Statement, StatementWriter, TransactionContext, Value,
};
use log::debug;
use std::{marker::PhantomData, time::Duration};

/// Command timeout applied to the raw dataset paths when neither the call
/// nor the configuration overrides it.
pub const DATASET_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-call options: an optional external transaction context whose
/// connection the call borrows, and an optional command-timeout override.
/// The default is a fresh connection per call and the configured timeout.
#[derive(Default)]
pub struct Options<'t> {
    pub transaction: Option<&'t mut TransactionContext>,
    pub timeout: Option<Duration>,
}

impl<'t> Options<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_transaction(transaction: &'t mut TransactionContext) -> Self {
        Self {
            transaction: Some(transaction),
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The connection a single operation runs against: either freshly opened and
/// owned by the call, torn down on every exit path, or borrowed from a
/// caller-supplied transaction context which keeps ownership and tears it
/// down at commit/rollback.
enum Session<'t> {
    Owned(Box<dyn Client>),
    Borrowed(&'t mut TransactionContext),
}

impl<'t> Session<'t> {
    async fn acquire(
        provider: &ConnectionProvider,
        transaction: Option<&'t mut TransactionContext>,
        operation: &'static str,
    ) -> Result<Session<'t>> {
        match transaction {
            Some(context) => {
                context.ensure_open().await?;
                Ok(Session::Borrowed(context))
            }
            None => {
                let mut client = provider.client(operation)?;
                client.open().await.map_err(RepositoryError::from)?;
                Ok(Session::Owned(client))
            }
        }
    }

    fn client(&mut self) -> Result<&mut (dyn Client + 'static)> {
        match self {
            Session::Owned(client) => Ok(client.as_mut()),
            Session::Borrowed(context) => context.client_mut(),
        }
    }

    async fn release(self) {
        if let Session::Owned(mut client) = self {
            if let Err(error) = client.close().await {
                log::warn!("failed to close the connection: {error:#}");
            }
        }
    }
}

/// Generic per-entity repository.
///
/// Every operation is asynchronous, resolves metadata and synthesizes its
/// statement before touching a connection, and runs against a [`Session`]
/// acquired from the per-call [`Options`]. The synchronous surface lives in
/// [`crate::blocking`].
pub struct Repository<E: Entity> {
    provider: ConnectionProvider,
    writer: StatementWriter,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(provider: ConnectionProvider) -> Self {
        let writer = StatementWriter::new(provider.engine());
        Self {
            provider,
            writer,
            entity: PhantomData,
        }
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// All rows of the entity's table.
    pub async fn get_all(&self, options: Options<'_>) -> Result<Vec<E>> {
        let metadata = self.metadata()?;
        let statement = self.writer.select_all(&metadata);
        let table = self.run_fetch(&statement, options, None).await?;
        table.iter().map(|row| E::from_row(&row)).collect()
    }

    /// The row with the given primary key, if any. Fails on entities with
    /// zero or composite key columns.
    pub async fn get_by_id(&self, id: impl Into<Value>, options: Options<'_>) -> Result<Option<E>> {
        let metadata = self.metadata()?;
        let statement = self.writer.select_by_id(&metadata, id.into())?;
        let table = self.run_fetch(&statement, options, None).await?;
        table.iter().next().map(|row| E::from_row(&row)).transpose()
    }

    /// Runs caller-supplied SQL and materializes the rows as entities.
    pub async fn query(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<Vec<E>> {
        let statement = Statement::text(sql, parameters);
        let table = self.run_fetch(&statement, options, None).await?;
        table.iter().map(|row| E::from_row(&row)).collect()
    }

    /// Inserts the entity's non-ignored columns. With `identity` the
    /// engine-generated key is fetched and returned; otherwise the affected
    /// row count is. Not implemented for Oracle; fails before any
    /// connection is attempted.
    pub async fn insert(&self, entity: &E, identity: bool, options: Options<'_>) -> Result<i64> {
        self.guard_mapped_write("insert")?;
        let metadata = self.metadata()?;
        let statement = self.writer.insert(entity, &metadata, identity)?;
        if identity {
            let value = self.run_scalar(&statement, options).await?;
            value
                .as_ref()
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    RepositoryError::data_access("insert did not return a generated identity")
                })
        } else {
            Ok(self.run_execute(&statement, options).await? as i64)
        }
    }

    /// Updates the row(s) matching the entity's primary key columns.
    /// Composite keys are supported. Not implemented for Oracle; fails
    /// before any connection is attempted.
    pub async fn update(&self, entity: &E, options: Options<'_>) -> Result<u64> {
        self.guard_mapped_write("update")?;
        let metadata = self.metadata()?;
        let statement = self.writer.update(entity, &metadata)?;
        self.run_execute(&statement, options).await
    }

    /// Deletes the row with the given primary key. Fails on entities with
    /// zero or composite key columns.
    pub async fn delete(&self, id: impl Into<Value>, options: Options<'_>) -> Result<u64> {
        let metadata = self.metadata()?;
        let statement = self.writer.delete(&metadata, id.into())?;
        self.run_execute(&statement, options).await
    }

    /// Runs caller-supplied SQL and yields the first cell of the first row.
    pub async fn execute_scalar(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<Option<Value>> {
        let statement = Statement::text(sql, parameters);
        self.run_scalar(&statement, options).await
    }

    /// Runs caller-supplied SQL that returns no rows.
    pub async fn execute_non_query(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<u64> {
        let statement = Statement::text(sql, parameters);
        self.run_execute(&statement, options).await
    }

    /// Executes a stored procedure that returns no rows.
    pub async fn execute_procedure(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<u64> {
        let statement = Statement::procedure(name, parameters);
        self.run_execute(&statement, options).await
    }

    /// Runs caller-supplied SQL and returns the raw result set. Unless
    /// overridden, the command timeout defaults to
    /// [`DATASET_COMMAND_TIMEOUT`].
    pub async fn get_data_set(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<DataTable> {
        let statement = Statement::text(sql, parameters);
        self.run_fetch(&statement, options, Some(DATASET_COMMAND_TIMEOUT))
            .await
    }

    /// Executes a stored procedure and returns the raw result set, with the
    /// same default timeout as [`get_data_set`](Self::get_data_set).
    pub async fn get_procedure_data_set(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<DataTable> {
        let statement = Statement::procedure(name, parameters);
        self.run_fetch(&statement, options, Some(DATASET_COMMAND_TIMEOUT))
            .await
    }

    /// Runs a caller-supplied insert and reads back the generated key.
    /// Engines with a session-scoped identity function get the retrieval
    /// appended to the insert; engines without one (Oracle) require an
    /// identity sequence name and read its current value on the same
    /// connection.
    pub async fn execute_insert_returning_identity(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        sequence: Option<&str>,
        options: Options<'_>,
    ) -> Result<i64> {
        let engine = self.provider.engine();
        let value = match engine.identity_query() {
            Some(retrieval) => {
                let statement = Statement::text(format!("{sql}\n{retrieval}"), parameters);
                self.run_scalar(&statement, options).await?
            }
            None => {
                let sequence = sequence.ok_or_else(|| {
                    RepositoryError::data_access(format!(
                        "an identity sequence name is required for the {engine} engine"
                    ))
                })?;
                let insert = Statement::text(sql, parameters);
                let retrieval =
                    Statement::text(engine.sequence_identity_query(sequence), Vec::new());
                let Options {
                    transaction,
                    timeout,
                } = options;
                let timeout = timeout.or(self.provider.config().command_timeout);
                debug!("executing: {}", insert.sql);
                let mut session =
                    Session::acquire(&self.provider, transaction, "insert returning identity")
                        .await?;
                let result = match session.client() {
                    Ok(client) => match client.execute(&insert, timeout).await {
                        Ok(_) => client
                            .fetch_scalar(&retrieval, timeout)
                            .await
                            .map_err(RepositoryError::from),
                        Err(error) => Err(error.into()),
                    },
                    Err(error) => Err(error),
                };
                session.release().await;
                result?
            }
        };
        value
            .as_ref()
            .and_then(Value::as_i64)
            .ok_or_else(|| RepositoryError::data_access("insert did not return a generated identity"))
    }

    fn metadata(&self) -> Result<EntityMetadata> {
        EntityMetadata::resolve::<E>(self.provider.engine())
    }

    fn guard_mapped_write(&self, operation: &'static str) -> Result<()> {
        let engine = self.provider.engine();
        if engine.supports_mapped_writes() {
            Ok(())
        } else {
            Err(RepositoryError::UnsupportedEngine { engine, operation })
        }
    }

    fn effective_timeout(
        &self,
        requested: Option<Duration>,
        fallback: Option<Duration>,
    ) -> Option<Duration> {
        requested
            .or(self.provider.config().command_timeout)
            .or(fallback)
    }

    async fn run_execute(&self, statement: &Statement, options: Options<'_>) -> Result<u64> {
        let Options {
            transaction,
            timeout,
        } = options;
        let timeout = self.effective_timeout(timeout, None);
        debug!("executing: {}", statement.sql);
        let mut session = Session::acquire(&self.provider, transaction, "execute").await?;
        let result = match session.client() {
            Ok(client) => client
                .execute(statement, timeout)
                .await
                .map_err(RepositoryError::from),
            Err(error) => Err(error),
        };
        session.release().await;
        result
    }

    async fn run_fetch(
        &self,
        statement: &Statement,
        options: Options<'_>,
        fallback_timeout: Option<Duration>,
    ) -> Result<DataTable> {
        let Options {
            transaction,
            timeout,
        } = options;
        let timeout = self.effective_timeout(timeout, fallback_timeout);
        debug!("fetching: {}", statement.sql);
        let mut session = Session::acquire(&self.provider, transaction, "fetch").await?;
        let result = match session.client() {
            Ok(client) => client
                .fetch(statement, timeout)
                .await
                .map_err(RepositoryError::from),
            Err(error) => Err(error),
        };
        session.release().await;
        result
    }

    async fn run_scalar(&self, statement: &Statement, options: Options<'_>) -> Result<Option<Value>> {
        let Options {
            transaction,
            timeout,
        } = options;
        let timeout = self.effective_timeout(timeout, None);
        debug!("fetching scalar: {}", statement.sql);
        let mut session = Session::acquire(&self.provider, transaction, "scalar").await?;
        let result = match session.client() {
            Ok(client) => client
                .fetch_scalar(statement, timeout)
                .await
                .map_err(RepositoryError::from),
            Err(error) => Err(error),
        };
        session.release().await;
        result
    }
}
