use crate::IsolationLevel;
use std::fmt::{self, Display};

/// The relational backend a repository is configured against.
///
/// Selects the dialect used for identifier quoting, parameter placeholders,
/// identity retrieval and the isolation levels the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    SqlServer,
    Oracle,
    Postgres,
}

impl Engine {
    /// Adjusts a raw table name to the engine's convention: SqlServer
    /// bracket-quotes, Postgres lower-cases, Oracle is left as declared.
    pub fn table_name(&self, raw: &str) -> String {
        match self {
            Engine::SqlServer => format!("[{raw}]"),
            Engine::Postgres => raw.to_lowercase(),
            Engine::Oracle => raw.to_string(),
        }
    }

    /// Quotes a column name for use in SQL text.
    pub fn column_name(&self, raw: &str) -> String {
        match self {
            Engine::SqlServer => format!("[{raw}]"),
            Engine::Postgres => raw.to_lowercase(),
            Engine::Oracle => raw.to_string(),
        }
    }

    /// The placeholder written into SQL text for a parameter with the given
    /// raw name. Parameters themselves keep the raw name.
    pub fn placeholder(&self, name: &str) -> String {
        match self {
            Engine::Oracle => format!(":{name}"),
            _ => format!("@{name}"),
        }
    }

    /// Whether the mapped write paths (`insert`, `update`) are implemented
    /// for this engine. Oracle is not; those operations must fail before any
    /// connection is attempted.
    pub fn supports_mapped_writes(&self) -> bool {
        !matches!(self, Engine::Oracle)
    }

    /// The statement appended to an insert to read back the generated key,
    /// when the engine exposes one without a sequence name.
    pub fn identity_query(&self) -> Option<&'static str> {
        match self {
            Engine::SqlServer => Some("SELECT CAST(SCOPE_IDENTITY() AS INT);"),
            Engine::Postgres => Some("SELECT LASTVAL();"),
            Engine::Oracle => None,
        }
    }

    /// The statement reading the current value of an identity sequence.
    /// Used by the raw identity-returning insert on engines with no
    /// session-scoped identity function.
    pub fn sequence_identity_query(&self, sequence: &str) -> String {
        match self {
            Engine::Oracle => format!("SELECT {sequence}.CURRVAL FROM DUAL"),
            _ => format!("SELECT CURRVAL('{sequence}')"),
        }
    }

    /// The isolation level actually used when beginning a transaction.
    /// Oracle does not honor the configured level and is forced to read
    /// committed.
    pub fn effective_isolation(&self, requested: IsolationLevel) -> IsolationLevel {
        match self {
            Engine::Oracle => IsolationLevel::ReadCommitted,
            _ => requested,
        }
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::SqlServer => write!(f, "SqlServer"),
            Engine::Oracle => write!(f, "Oracle"),
            Engine::Postgres => write!(f, "Postgres"),
        }
    }
}
