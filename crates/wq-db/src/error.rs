//! Error types for wq-db

use thiserror::Error;

/// Warehouse operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Warehouse connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Mutex poisoned (D003)
    #[error("[D003] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Transport failure talking to a remote warehouse (D004)
    #[error("[D004] Warehouse request failed: {0}")]
    Http(String),

    /// Remote warehouse rejected the request (D005)
    #[error("[D005] Warehouse API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response could not be decoded (D006)
    #[error("[D006] Could not decode warehouse response: {0}")]
    Decode(String),

    /// Configuration or credential problem (D007)
    #[error("[D007] {0}")]
    Config(#[from] wq_core::CoreError),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DbError::Decode(err.to_string())
        } else {
            DbError::Http(err.to_string())
        }
    }
}

/// Failures of the SELECT-only query executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Statement is not a SELECT (X001)
    #[error("[X001] Only SELECT statements may be executed, got: {statement}")]
    DisallowedStatement { statement: String },

    /// Warehouse reported an error (X002)
    #[error("[X002] Warehouse error: {message}")]
    BackendError { message: String },

    /// A returned row was not a key/value object (X003)
    #[error("[X003] Row {row_index} failed validation: {message}")]
    ValidationFailure { row_index: usize, message: String },

    /// Execution exceeded its time budget (X004)
    #[error("[X004] Query timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl From<DbError> for ExecutionError {
    fn from(err: DbError) -> Self {
        ExecutionError::BackendError {
            message: err.to_string(),
        }
    }
}
