use finetrack_storage::StorageError;
use thiserror::Error;

/// Failures while starting the service. Operation failures are
/// `FunctionsError`s instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("telemetry error: {0}")]
    Telemetry(String),
}
