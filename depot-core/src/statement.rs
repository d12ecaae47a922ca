use crate::{
    Engine, Entity, EntityMetadata, RepositoryError, Result, Value, separated,
};

/// How the client should interpret the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Plain SQL text.
    Text,
    /// A stored procedure name.
    Procedure,
}

/// A named parameter. The name is the raw column name; the engine-specific
/// prefix exists only in the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ephemeral statement: SQL text plus its ordered parameters. Built per
/// call and discarded after execution.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: CommandKind,
    pub sql: String,
    pub parameters: Vec<Parameter>,
}

impl Statement {
    pub fn text(sql: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            kind: CommandKind::Text,
            sql: sql.into(),
            parameters,
        }
    }

    pub fn procedure(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            kind: CommandKind::Procedure,
            sql: name.into(),
            parameters,
        }
    }
}

/// Synthesizes the fixed set of statement shapes from resolved metadata.
///
/// Column and placeholder lists are explicit ordered sequences joined by
/// [`separated`]; nothing is appended and trimmed back.
#[derive(Debug, Clone, Copy)]
pub struct StatementWriter {
    engine: Engine,
}

impl StatementWriter {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// `INSERT INTO table (columns...) VALUES (placeholders...)`, skipping
    /// ignored columns (which include the identity column). With `identity`
    /// the dialect's key-retrieval statement is appended and the result is
    /// meant to be fetched as a scalar.
    pub fn insert<E: Entity>(
        &self,
        entity: &E,
        metadata: &EntityMetadata,
        identity: bool,
    ) -> Result<Statement> {
        let included: Vec<_> = entity
            .values()
            .into_iter()
            .filter(|(name, _)| !metadata.is_ignored(name))
            .collect();

        let mut sql = String::with_capacity(256);
        sql.push_str("INSERT INTO ");
        sql.push_str(&metadata.table_name);
        sql.push_str(" (");
        separated(
            &mut sql,
            included.iter(),
            |out, (name, _)| {
                out.push_str(&self.engine.column_name(name));
            },
            ", ",
        );
        sql.push_str(") VALUES (");
        separated(
            &mut sql,
            included.iter(),
            |out, (name, _)| {
                out.push_str(&self.engine.placeholder(name));
            },
            ", ",
        );
        sql.push_str(");");
        if identity {
            let retrieval = self.engine.identity_query().ok_or(
                RepositoryError::UnsupportedEngine {
                    engine: self.engine,
                    operation: "insert returning identity",
                },
            )?;
            sql.push('\n');
            sql.push_str(retrieval);
        }

        let parameters = included
            .into_iter()
            .map(|(name, value)| Parameter::new(name, value))
            .collect();
        Ok(Statement::text(sql, parameters))
    }

    /// `UPDATE table SET ... WHERE key = @key AND ...`. Primary keys are
    /// excluded from SET but always bound; composite keys are supported and
    /// conjoined with AND.
    pub fn update<E: Entity>(&self, entity: &E, metadata: &EntityMetadata) -> Result<Statement> {
        if metadata.primary_keys.is_empty() {
            return Err(RepositoryError::MissingPrimaryKey {
                entity: metadata.entity_name,
            });
        }
        let values = entity.values();

        let mut sql = String::with_capacity(256);
        sql.push_str("UPDATE ");
        sql.push_str(&metadata.table_name);
        sql.push_str(" SET ");
        separated(
            &mut sql,
            values
                .iter()
                .filter(|(name, _)| !metadata.is_ignored(name) && !metadata.is_primary_key(name)),
            |out, (name, _)| {
                out.push_str(&self.engine.column_name(name));
                out.push_str(" = ");
                out.push_str(&self.engine.placeholder(name));
            },
            ", ",
        );
        sql.push_str(" WHERE ");
        separated(
            &mut sql,
            metadata.primary_keys.iter(),
            |out, key| {
                out.push_str(&self.engine.column_name(key));
                out.push_str(" = ");
                out.push_str(&self.engine.placeholder(key));
            },
            " AND ",
        );
        sql.push(';');

        let parameters = values
            .into_iter()
            .filter(|(name, _)| !metadata.is_ignored(name) || metadata.is_primary_key(name))
            .map(|(name, value)| Parameter::new(name, value))
            .collect();
        Ok(Statement::text(sql, parameters))
    }

    /// `DELETE FROM table WHERE key = @ID`. Requires exactly one key column.
    pub fn delete(&self, metadata: &EntityMetadata, id: Value) -> Result<Statement> {
        let key = metadata.single_primary_key("delete")?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = {};",
            metadata.table_name,
            self.engine.column_name(key),
            self.engine.placeholder("ID"),
        );
        Ok(Statement::text(sql, vec![Parameter::new("ID", id)]))
    }

    /// `SELECT * FROM table WHERE key = @ID`. Requires exactly one key
    /// column.
    pub fn select_by_id(&self, metadata: &EntityMetadata, id: Value) -> Result<Statement> {
        let key = metadata.single_primary_key("get_by_id")?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = {};",
            metadata.table_name,
            self.engine.column_name(key),
            self.engine.placeholder("ID"),
        );
        Ok(Statement::text(sql, vec![Parameter::new("ID", id)]))
    }

    pub fn select_all(&self, metadata: &EntityMetadata) -> Statement {
        Statement::text(format!("SELECT * FROM {};", metadata.table_name), Vec::new())
    }
}
