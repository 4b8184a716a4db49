use std::sync::Arc;

use extract::GeminiClient;
use fetch::FirecrawlClient;
use pipeline::Analyzer;
use verify::GoogleSearchClient;

use crate::config::{AppConfig, ConfigError};
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    /// `None` when credentials are missing; every analysis then fails pre-flight.
    pub analyzer: Option<Arc<Analyzer>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(analyzer: Option<Arc<Analyzer>>) -> Self {
        Self {
            analyzer,
            metrics: Metrics::new(),
        }
    }

    /// Wire the real service clients, or keep the server up without them when
    /// credentials are missing.
    pub fn from_config(config: &AppConfig) -> Self {
        match build_analyzer(config) {
            Ok(analyzer) => Self::new(Some(Arc::new(analyzer))),
            Err(e) => {
                tracing::error!(error = %e, "Analysis disabled until credentials are configured");
                Self::new(None)
            }
        }
    }
}

pub fn build_analyzer(config: &AppConfig) -> Result<Analyzer, ConfigError> {
    let keys = config.credentials.resolve()?;
    let endpoints = &config.endpoints;

    let fetcher = FirecrawlClient::new(endpoints.firecrawl_base_url.clone(), keys.firecrawl);
    let llm = GeminiClient::new(
        endpoints.gemini_base_url.clone(),
        endpoints.gemini_model.clone(),
        keys.gemini,
    );
    let searcher = GoogleSearchClient::new(
        endpoints.search_base_url.clone(),
        keys.google_search,
        keys.google_search_engine_id,
    );

    Ok(Analyzer::new(
        Arc::new(fetcher),
        Arc::new(llm),
        Arc::new(searcher),
        config.pipeline,
    ))
}
