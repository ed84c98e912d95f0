use finetrack_core::{CoreError, FunctionsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid key path: {0}")]
    InvalidPath(String),

    #[error("store was written with schema version {0}, newer than this build")]
    SchemaVersion(i64),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl From<StorageError> for FunctionsError {
    fn from(err: StorageError) -> Self {
        FunctionsError::internal(format!("Storage failure: {err}"))
    }
}
