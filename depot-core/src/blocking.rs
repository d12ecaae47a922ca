//! Synchronous adapters over the asynchronous repository.
//!
//! A single shared current-thread runtime drives every wrapped call; a
//! failure in the asynchronous path re-raises through the blocking one.
//! Must not be used from inside an asynchronous context.

use crate::{ConnectionProvider, DataTable, Entity, Options, Parameter, Result, Value};
use std::{future::Future, sync::LazyLock};
use tokio::runtime::{Builder, Runtime};

static RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("failed to build the blocking runtime")
});

/// Blocks the calling thread on a repository future.
pub fn wait<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}

/// Blocking counterpart of [`crate::Repository`]; every operation delegates
/// through [`wait`].
pub struct Repository<E: Entity> {
    inner: crate::Repository<E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self {
            inner: crate::Repository::new(provider),
        }
    }

    pub fn get_all(&self, options: Options<'_>) -> Result<Vec<E>> {
        wait(self.inner.get_all(options))
    }

    pub fn get_by_id(&self, id: impl Into<Value>, options: Options<'_>) -> Result<Option<E>> {
        wait(self.inner.get_by_id(id, options))
    }

    pub fn query(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<Vec<E>> {
        wait(self.inner.query(sql, parameters, options))
    }

    pub fn insert(&self, entity: &E, identity: bool, options: Options<'_>) -> Result<i64> {
        wait(self.inner.insert(entity, identity, options))
    }

    pub fn update(&self, entity: &E, options: Options<'_>) -> Result<u64> {
        wait(self.inner.update(entity, options))
    }

    pub fn delete(&self, id: impl Into<Value>, options: Options<'_>) -> Result<u64> {
        wait(self.inner.delete(id, options))
    }

    pub fn execute_scalar(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<Option<Value>> {
        wait(self.inner.execute_scalar(sql, parameters, options))
    }

    pub fn execute_non_query(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<u64> {
        wait(self.inner.execute_non_query(sql, parameters, options))
    }

    pub fn execute_procedure(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<u64> {
        wait(self.inner.execute_procedure(name, parameters, options))
    }

    pub fn get_data_set(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<DataTable> {
        wait(self.inner.get_data_set(sql, parameters, options))
    }

    pub fn get_procedure_data_set(
        &self,
        name: &str,
        parameters: Vec<Parameter>,
        options: Options<'_>,
    ) -> Result<DataTable> {
        wait(self.inner.get_procedure_data_set(name, parameters, options))
    }

    pub fn execute_insert_returning_identity(
        &self,
        sql: &str,
        parameters: Vec<Parameter>,
        sequence: Option<&str>,
        options: Options<'_>,
    ) -> Result<i64> {
        wait(
            self.inner
                .execute_insert_returning_identity(sql, parameters, sequence, options),
        )
    }

    /// The wrapped asynchronous repository.
    pub fn as_async(&self) -> &crate::Repository<E> {
        &self.inner
    }
}
