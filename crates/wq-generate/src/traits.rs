//! Generator abstraction

use crate::error::GenerateResult;
use async_trait::async_trait;
use wq_core::{SqlCandidate, UnifiedSchema};

/// Turns a natural-language question into SQL over a known schema
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Propose SQL answering `question`.
    ///
    /// Implementations must only return candidates that pass
    /// [`SqlCandidate::validate`].
    async fn generate(&self, question: &str, schema: &UnifiedSchema) -> GenerateResult<SqlCandidate>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
