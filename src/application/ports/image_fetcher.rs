use async_trait::async_trait;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("payload is not a recognised image format")]
    UnsupportedFormat,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
