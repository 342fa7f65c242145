use anvyl_core::AnvylError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for AnvylError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => AnvylError::NotFound(msg),
            DbError::Conflict(msg) => AnvylError::Conflict(msg),
            DbError::Invariant(msg) => AnvylError::Invariant(msg),
            other => AnvylError::Internal(other.to_string()),
        }
    }
}
