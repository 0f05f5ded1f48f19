//! Error types for schema introspection.

use thiserror::Error;
use wq_core::CoreError;

/// Fatal introspection errors.
///
/// Failures of individual metadata queries are not errors; they are recorded
/// on the schema document instead.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// A target could not be resolved or named an unsafe identifier (I001).
    #[error("[I001] Invalid dataset target: {0}")]
    InvalidTarget(#[from] CoreError),
}

impl IntrospectError {
    /// The underlying core error.
    pub fn core_error(&self) -> &CoreError {
        match self {
            IntrospectError::InvalidTarget(err) => err,
        }
    }
}

/// Result type alias for [`IntrospectError`].
pub type IntrospectResult<T> = Result<T, IntrospectError>;
