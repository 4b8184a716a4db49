pub mod firecrawl;

pub use firecrawl::FirecrawlClient;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Why a page produced no usable text. Every variant is terminal for the request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("scrape request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("scrape service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("scrape response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("no content extracted from {url}")]
    Empty { url: String },
}

/// Retrieves the text rendering of a web page.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}
