//! In-memory stand-ins for the three external services.
//!
//! Each double replays a script in call order and records what it was asked,
//! so tests can assert both the outcome and which calls were (not) made.

use anyhow::Result;
use async_trait::async_trait;
use extract::{GenerationParams, TextGenerator};
use fetch::{ContentFetcher, FetchError};
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;
use verify::{SearchRequest, SearchSnippet, WebSearcher};

/// Returns the same page text (or failure) for every URL.
pub struct StaticFetcher {
    text: Option<String>,
    calls: Mutex<Vec<Url>>,
}

impl StaticFetcher {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.clone());
        self.text.clone().ok_or_else(|| FetchError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        })
    }
}

/// Replays model replies in order. Unscripted calls fail.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<(String, GenerationParams)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    pub fn params(&self) -> Vec<GenerationParams> {
        self.prompts.lock().unwrap().iter().map(|(_, p)| *p).collect()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), *params));

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::Error::msg(message)),
            None => anyhow::bail!("no model reply scripted"),
        }
    }
}

/// Replays search results in order. Unscripted calls fail.
#[derive(Default)]
pub struct ScriptedSearcher {
    results: Mutex<VecDeque<Result<Vec<SearchSnippet>, String>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(self, snippets: Vec<SearchSnippet>) -> Self {
        self.results.lock().unwrap().push_back(Ok(snippets));
        self
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.results.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for ScriptedSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchSnippet>> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some(Ok(snippets)) => Ok(snippets),
            Some(Err(message)) => Err(anyhow::Error::msg(message)),
            None => anyhow::bail!("no search result scripted"),
        }
    }
}

/// A snippet with predictable fields.
pub fn snippet(title: &str, excerpt: &str, link: &str) -> SearchSnippet {
    SearchSnippet {
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        source_link: link.to_string(),
    }
}
