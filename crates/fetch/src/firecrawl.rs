use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ContentFetcher, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

#[derive(Clone)]
pub struct FirecrawlClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
}

/// v1 nests the page under `data`; older deployments answer flat.
#[derive(Debug, Default, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Option<ScrapedPage>,
    #[serde(flatten)]
    page: ScrapedPage,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapedPage {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl ScrapedPage {
    fn text(self) -> Option<String> {
        [self.markdown, self.content]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

impl ScrapeResponse {
    fn into_text(self) -> Option<String> {
        self.data
            .and_then(ScrapedPage::text)
            .or_else(|| self.page.text())
    }
}

impl FirecrawlClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(api_key: String) -> Self {
        Self::new(DEFAULT_BASE_URL.to_string(), api_key)
    }
}

#[async_trait]
impl ContentFetcher for FirecrawlClient {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let endpoint = format!("{}/v1/scrape", self.base_url);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&ScrapeRequest {
                url: url.as_str(),
                formats: ["markdown"],
            })
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("unknown").to_string();
            tracing::error!(status = status.as_u16(), %url, "Firecrawl scrape failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let scraped: ScrapeResponse = response
            .json()
            .await
            .map_err(FetchError::Decode)?;

        let text = scraped.into_text().ok_or_else(|| FetchError::Empty {
            url: url.to_string(),
        })?;

        tracing::debug!(%url, chars = text.len(), "Scraped page content");
        Ok(text)
    }
}
