pub mod http_fetcher;

use async_trait::async_trait;
use url::Url;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Downloads raw feed documents. Nothing is cached between calls.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}
