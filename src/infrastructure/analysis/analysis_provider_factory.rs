use std::sync::Arc;

use crate::application::ports::AnalysisProvider;
use crate::presentation::config::{AnalysisProviderSetting, AnalysisSettings};

use super::{HttpAnalysisProvider, MockAnalysisProvider};

pub struct AnalysisProviderFactory;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisProviderFactoryError {
    #[error("missing configuration: {0}")]
    MissingSetting(&'static str),
    #[error("provider initialization failed: {0}")]
    InitializationFailed(String),
}

impl AnalysisProviderFactory {
    pub fn create(
        settings: &AnalysisSettings,
    ) -> Result<Arc<dyn AnalysisProvider>, AnalysisProviderFactoryError> {
        match settings.provider {
            AnalysisProviderSetting::Mock => {
                tracing::info!("Using mock analysis provider");
                Ok(Arc::new(MockAnalysisProvider::new(
                    settings.embedding_dimension,
                )))
            }
            AnalysisProviderSetting::Http => {
                let api_key = settings
                    .api_key
                    .as_deref()
                    .filter(|k| !k.is_empty())
                    .ok_or(AnalysisProviderFactoryError::MissingSetting("analysis.api_key"))?;
                let base_url = settings
                    .base_url
                    .as_deref()
                    .ok_or(AnalysisProviderFactoryError::MissingSetting("analysis.base_url"))?;
                let embedding_url = settings.embedding_url.as_deref().ok_or(
                    AnalysisProviderFactoryError::MissingSetting("analysis.embedding_url"),
                )?;

                tracing::info!(
                    vision_model = %settings.vision_model,
                    embedding_dimension = settings.embedding_dimension,
                    "Using HTTP analysis provider"
                );
                let provider = HttpAnalysisProvider::new(
                    base_url,
                    api_key,
                    &settings.vision_model,
                    embedding_url,
                    settings.embedding_dimension,
                )
                .map_err(|e| AnalysisProviderFactoryError::InitializationFailed(e.to_string()))?;
                Ok(Arc::new(provider))
            }
        }
    }
}
