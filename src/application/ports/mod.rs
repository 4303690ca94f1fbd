mod analysis_provider;
mod image_fetcher;
mod media_repository;
mod repository_error;

pub use analysis_provider::{AnalysisError, AnalysisProvider};
pub use image_fetcher::{FetchError, ImageFetcher};
pub use media_repository::MediaRepository;
pub use repository_error::RepositoryError;
