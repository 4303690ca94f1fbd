mod analysis_provider_factory;
mod http_analysis_provider;
mod mock_analysis_provider;

pub use analysis_provider_factory::{AnalysisProviderFactory, AnalysisProviderFactoryError};
pub use http_analysis_provider::{HttpAnalysisProvider, parse_tags};
pub use mock_analysis_provider::MockAnalysisProvider;
