pub mod aggregate;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use aggregate::{ResultEntry, aggregate};

use extract::{ClaimExtractor, GenerationParams, TextGenerator};
use fetch::{ContentFetcher, FetchError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use url::Url;
use verify::{ClaimVerifier, VerifierSettings, WebSearcher};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub extraction_params: GenerationParams,
    pub verifier: VerifierSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            extraction_params: GenerationParams::new(0.2, 8192),
            verifier: VerifierSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("content unavailable: {0}")]
    ContentUnavailable(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Nothing on the page was relevant to the query.
    Empty,
    Success(Vec<ResultEntry>),
}

impl AnalysisOutcome {
    pub fn entries(&self) -> &[ResultEntry] {
        match self {
            AnalysisOutcome::Empty => &[],
            AnalysisOutcome::Success(entries) => entries,
        }
    }
}

/// Fetch → extract → verify each item → aggregate, strictly in sequence.
pub struct Analyzer {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: ClaimExtractor,
    verifier: ClaimVerifier,
}

impl Analyzer {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        llm: Arc<dyn TextGenerator>,
        searcher: Arc<dyn WebSearcher>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor: ClaimExtractor::new(llm.clone(), settings.extraction_params),
            verifier: ClaimVerifier::new(llm, searcher, settings.verifier),
        }
    }

    pub async fn analyze(&self, url: &Url, query: &str) -> Result<AnalysisOutcome, PipelineError> {
        // Step 1: Fetch page text; nothing else runs without it
        let text = self.fetcher.fetch(url).await.inspect_err(|e| {
            tracing::error!(error = %e, %url, "Content fetch failed");
        })?;

        // Step 2: Pick out the relevant items
        let items = self.extractor.extract(&text, query).await;
        if items.is_empty() {
            tracing::info!(%url, "No relevant entries found");
            return Ok(AnalysisOutcome::Empty);
        }

        // Step 3: Verify one item at a time
        let total = items.len();
        let mut verified = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            let outcome = self.verifier.verify(&item).await;
            tracing::info!(
                item = index + 1,
                total,
                score = outcome.confidence_score,
                "Verified entry"
            );
            verified.push((item, outcome));
        }

        // Step 4: Aggregate in extraction order
        Ok(AnalysisOutcome::Success(aggregate(verified)))
    }
}
