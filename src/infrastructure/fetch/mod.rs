mod http_image_fetcher;
mod mock_image_fetcher;

pub use http_image_fetcher::HttpImageFetcher;
pub use mock_image_fetcher::MockImageFetcher;
