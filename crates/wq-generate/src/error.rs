//! Error types for wq-generate

use thiserror::Error;

/// SQL generation failures. All of them surface as `GenerationFailure` on a run.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Request never got a response (G001)
    #[error("[G001] Generation request failed: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status (G002)
    #[error("[G002] Generation endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response carried no usable content (G003)
    #[error("[G003] Generation response was empty")]
    EmptyResponse,

    /// Content was not a SQL candidate (G004)
    #[error("[G004] Could not parse SQL candidate: {0}")]
    Unparsable(String),

    /// Candidate parsed but is unusable (G005)
    #[error("[G005] Invalid SQL candidate: {0}")]
    InvalidCandidate(String),

    /// Missing credentials or bad settings (G006)
    #[error("[G006] {0}")]
    Config(#[from] wq_core::CoreError),
}

/// Result type alias for GenerateError
pub type GenerateResult<T> = Result<T, GenerateError>;

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerateError::Unparsable(err.to_string())
        } else {
            GenerateError::Transport(err.to_string())
        }
    }
}
