//! Error types for Coalesce
//!
//! Every error that crosses a crate boundary is an [`Error`]. Callers outside
//! the core only ever see the machine-readable [`ErrorCode`] plus a message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable error code surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input was empty or otherwise malformed
    BadRequest,
    /// Input exceeded the configured maximum length
    PayloadTooLarge,
    /// The computation itself failed
    ProcessingFailed,
    /// A pending item was rejected by an administrative clear
    QueueCleared,
    /// A cache or queue backend could not be reached
    BackendUnavailable,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::ProcessingFailed => "PROCESSING_FAILED",
            ErrorCode::QueueCleared => "QUEUE_CLEARED",
            ErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller is at fault (BAD_REQUEST class)
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorCode::BadRequest | ErrorCode::PayloadTooLarge)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coalesce error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Request
    // ========================================================================
    #[error("Validation error ({code}): {message}")]
    Validation { code: ErrorCode, message: String },

    // ========================================================================
    // Queue
    // ========================================================================
    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Queue '{0}' was cleared while the item was pending")]
    Cleared(String),

    // ========================================================================
    // Backends
    // ========================================================================
    #[error("Backend unavailable: {0}")]
    Backend(String),

    // ========================================================================
    // External conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a validation error
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Error::Validation {
            code,
            message: message.into(),
        }
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation { code, .. } => *code,
            Error::Processing(_) => ErrorCode::ProcessingFailed,
            Error::Cleared(_) => ErrorCode::QueueCleared,
            Error::Backend(_) => ErrorCode::BackendUnavailable,
            Error::Config(_) | Error::Io(_) | Error::Json(_) | Error::Internal(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Backend failures are the only ones worth retrying; the core never does
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Errors whose message can be shown to the caller as-is
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
