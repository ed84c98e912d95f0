use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid identifier format: {0}")]
    InvalidFormat(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Caller-visible error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    InvalidArgument,
    Unavailable,
    AlreadyExists,
    Internal,
    PermissionDenied,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid-argument",
            Self::Unavailable => "unavailable",
            Self::AlreadyExists => "already-exists",
            Self::Internal => "internal",
            Self::PermissionDenied => "permission-denied",
        }
    }
}

/// Error returned to the caller of an operation: a code plus a message
/// whose wording clients may depend on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}: {message}", code.as_str())]
pub struct FunctionsError {
    pub code: ErrorCode,
    pub message: String,
}

impl FunctionsError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }
}

impl From<CoreError> for FunctionsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFormat(_) | CoreError::InvalidDate(_) => {
                FunctionsError::invalid_argument(err.to_string())
            }
            CoreError::Serialization(_) => {
                FunctionsError::internal(err.to_string())
            }
        }
    }
}
