use pipeline::PipelineSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FIRECRAWL_API_KEY: &str = "FIRECRAWL_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GOOGLE_SEARCH_API_KEY: &str = "GOOGLE_SEARCH_API_KEY";
pub const GOOGLE_SEARCH_ENGINE_ID: &str = "GOOGLE_SEARCH_ENGINE_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub credentials: Credentials,
    pub endpoints: EndpointConfig,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub firecrawl_base_url: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub search_base_url: String,
}

/// The four secrets the pipeline needs. Blank values count as missing.
#[derive(Clone, Default)]
pub struct Credentials {
    pub firecrawl_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
}

/// Credentials after the pre-flight check: all present.
#[derive(Clone)]
pub struct ApiKeys {
    pub firecrawl: String,
    pub gemini: String,
    pub google_search: String,
    pub google_search_engine_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("missing", &self.missing())
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (FIRECRAWL_API_KEY, &self.firecrawl_api_key),
            (GEMINI_API_KEY, &self.gemini_api_key),
            (GOOGLE_SEARCH_API_KEY, &self.google_search_api_key),
            (GOOGLE_SEARCH_ENGINE_ID, &self.google_search_engine_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn resolve(&self) -> Result<ApiKeys, ConfigError> {
        match (
            &self.firecrawl_api_key,
            &self.gemini_api_key,
            &self.google_search_api_key,
            &self.google_search_engine_id,
        ) {
            (Some(firecrawl), Some(gemini), Some(google_search), Some(engine_id)) => Ok(ApiKeys {
                firecrawl: firecrawl.clone(),
                gemini: gemini.clone(),
                google_search: google_search.clone(),
                google_search_engine_id: engine_id.clone(),
            }),
            _ => Err(ConfigError::MissingCredentials(self.missing())),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            firecrawl_base_url: fetch::firecrawl::DEFAULT_BASE_URL.to_string(),
            gemini_base_url: extract::llm::DEFAULT_BASE_URL.to_string(),
            gemini_model: extract::llm::DEFAULT_MODEL.to_string(),
            search_base_url: verify::search::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let credentials = Credentials {
            firecrawl_api_key: var(FIRECRAWL_API_KEY),
            gemini_api_key: var(GEMINI_API_KEY),
            google_search_api_key: var(GOOGLE_SEARCH_API_KEY),
            google_search_engine_id: var(GOOGLE_SEARCH_ENGINE_ID),
        };

        let defaults = EndpointConfig::default();
        let endpoints = EndpointConfig {
            firecrawl_base_url: var("FIRECRAWL_BASE_URL").unwrap_or(defaults.firecrawl_base_url),
            gemini_base_url: var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            gemini_model: var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            search_base_url: var("GOOGLE_SEARCH_BASE_URL").unwrap_or(defaults.search_base_url),
        };

        let server = ServerConfig {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| ServerConfig::default().bind_addr),
        };

        let mut pipeline = PipelineSettings::default();
        if let Some(value) = var("SEARCH_MAX_RESULTS") {
            pipeline.verifier.search.max_results = parse_number("SEARCH_MAX_RESULTS", value)?;
        }
        if let Some(value) = var("SEARCH_WINDOW_RADIUS_YEARS") {
            pipeline.verifier.search.window_radius_years =
                parse_number("SEARCH_WINDOW_RADIUS_YEARS", value)?;
        }

        Ok(Self {
            server,
            credentials,
            endpoints,
            pipeline,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
