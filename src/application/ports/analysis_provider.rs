use async_trait::async_trait;

use crate::domain::{Embedding, ImageAnalysis, ServiceCategory};

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Stage one: tag extraction guided by the category hint.
    async fn analyze(
        &self,
        image: &[u8],
        category: ServiceCategory,
    ) -> Result<ImageAnalysis, AnalysisError>;

    /// Stage two: image embedding conditioned on free-text context.
    async fn embed(&self, image: &[u8], context: &str) -> Result<Embedding, AnalysisError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("analysis rate limited")]
    RateLimited,
    #[error("image too large for analysis: {0} bytes")]
    ImageTooLarge(usize),
    #[error("invalid analysis response: {0}")]
    InvalidResponse(String),
}
