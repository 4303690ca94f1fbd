use crate::application::ports::{FetchError, ImageFetcher};

/// Returns a fixed PNG signature for every url.
pub struct MockImageFetcher;

#[async_trait::async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }
}
