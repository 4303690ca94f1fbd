use crate::application::ports::{AnalysisError, AnalysisProvider};
use crate::domain::{Embedding, ImageAnalysis, ServiceCategory};

pub struct MockAnalysisProvider {
    dimension: usize,
}

impl MockAnalysisProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for MockAnalysisProvider {
    async fn analyze(
        &self,
        _image: &[u8],
        category: ServiceCategory,
    ) -> Result<ImageAnalysis, AnalysisError> {
        Ok(ImageAnalysis::new(vec![
            category.as_str().to_string(),
            "portfolio".to_string(),
        ]))
    }

    async fn embed(&self, _image: &[u8], _context: &str) -> Result<Embedding, AnalysisError> {
        Ok(Embedding::new(vec![0.1; self.dimension]))
    }
}
