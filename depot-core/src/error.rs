use crate::Engine;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Failures surfaced by the repository layer.
///
/// Client failures of any structured kind collapse into [`DataAccess`]
/// carrying the message chain as text; callers get no richer classification
/// than that.
///
/// [`DataAccess`]: RepositoryError::DataAccess
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("entity `{entity}` does not define a primary key column")]
    MissingPrimaryKey { entity: &'static str },

    #[error("entity `{entity}` has a composite primary key, which `{operation}` does not support")]
    CompositeKeyUnsupported {
        entity: &'static str,
        operation: &'static str,
    },

    #[error("`{entity}` mapping must be registered as an `EntityMap`")]
    MappingConfiguration { entity: &'static str },

    #[error("`{operation}` is not implemented for the {engine} engine")]
    UnsupportedEngine {
        engine: Engine,
        operation: &'static str,
    },

    #[error("{0}")]
    DataAccess(String),
}

impl RepositoryError {
    pub fn data_access(message: impl Into<String>) -> Self {
        RepositoryError::DataAccess(message.into())
    }
}

impl From<anyhow::Error> for RepositoryError {
    fn from(error: anyhow::Error) -> Self {
        RepositoryError::DataAccess(format!("{error:#}"))
    }
}
