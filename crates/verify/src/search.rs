use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Google Custom Search never returns more than ten results per call.
const MAX_RESULTS_PER_QUERY: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub title: String,
    pub excerpt: String,
    pub source_link: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchSettings {
    pub max_results: u8,
    pub window_radius_years: u16,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS_PER_QUERY,
            window_radius_years: 1,
        }
    }
}

/// Years around the event that the evidence should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start_year: i32,
    pub end_year: i32,
}

impl SearchWindow {
    /// `None` when the window would leave the representable year range.
    pub fn around(year: i32, radius: u16) -> Option<Self> {
        let radius = i32::from(radius);
        Some(Self {
            start_year: year.checked_sub(radius)?,
            end_year: year.checked_add(radius)?,
        })
    }

    pub fn width_years(&self) -> i32 {
        self.end_year - self.start_year
    }

    /// The window as Google's `dateRestrict` value. The service reads `yN` as
    /// "the last N years", so only the width survives.
    pub fn date_restrict(&self) -> String {
        format!("y{}", self.width_years())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub date_restrict: Option<String>,
    pub max_results: u8,
}

impl SearchRequest {
    /// Query for `claim`, pinned to the event year when one is known.
    pub fn for_claim(claim: &str, event_year: Option<i32>, settings: &SearchSettings) -> Self {
        let max_results = settings.max_results.clamp(1, MAX_RESULTS_PER_QUERY);
        let windowed = event_year.and_then(|year| {
            SearchWindow::around(year, settings.window_radius_years).map(|window| (year, window))
        });

        match windowed {
            Some((year, window)) => Self {
                query: format!("{} {}", claim, year),
                date_restrict: Some(window.date_restrict()),
                max_results,
            },
            None => Self {
                query: claim.to_string(),
                date_restrict: None,
                max_results,
            },
        }
    }
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchSnippet>>;
}

#[derive(Clone)]
pub struct GoogleSearchClient {
    base_url: String,
    api_key: String,
    engine_id: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Deserialize)]
struct CustomSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl From<CustomSearchItem> for SearchSnippet {
    fn from(item: CustomSearchItem) -> Self {
        Self {
            title: item.title,
            excerpt: item.snippet,
            source_link: item.link,
        }
    }
}

impl GoogleSearchClient {
    pub fn new(base_url: String, api_key: String, engine_id: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            engine_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_credentials(api_key: String, engine_id: String) -> Self {
        Self::new(DEFAULT_BASE_URL.to_string(), api_key, engine_id)
    }

    fn query_params(&self, request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("cx", self.engine_id.clone()),
            ("q", request.query.clone()),
        ];
        if let Some(restrict) = &request.date_restrict {
            params.push(("dateRestrict", restrict.clone()));
        }
        params.push(("num", request.max_results.to_string()));
        params
    }
}

#[async_trait]
impl WebSearcher for GoogleSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchSnippet>> {
        let url = format!("{}/customsearch/v1", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&self.query_params(request))
            .send()
            .await
            .context("Failed to send request to Google Search")?;

        if !response.status().is_success() {
            anyhow::bail!("Google Search request failed: {}", response.status());
        }

        let body: CustomSearchResponse = response
            .json()
            .await
            .context("Failed to parse Google Search response")?;

        Ok(body
            .items
            .into_iter()
            .take(usize::from(request.max_results))
            .map(SearchSnippet::from)
            .collect())
    }
}
