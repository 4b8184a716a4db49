pub mod outcome;
pub mod prompt;
pub mod search;

pub use outcome::{ClaimStatement, VerificationOutcome};
pub use search::{
    GoogleSearchClient, SearchRequest, SearchSettings, SearchSnippet, SearchWindow, WebSearcher,
};

use extract::{ExtractedItem, GenerationParams, TextGenerator, extract_json_object};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerifierSettings {
    pub claim_params: GenerationParams,
    pub scoring_params: GenerationParams,
    pub search: SearchSettings,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            claim_params: GenerationParams::new(0.2, 1024),
            scoring_params: GenerationParams::new(0.3, 1024),
            search: SearchSettings::default(),
        }
    }
}

/// Checks one extracted item against web evidence.
///
/// Each step degrades to a zero-score placeholder instead of failing, so one
/// bad item never takes the rest of a batch down with it.
#[derive(Clone)]
pub struct ClaimVerifier {
    llm: Arc<dyn TextGenerator>,
    searcher: Arc<dyn WebSearcher>,
    settings: VerifierSettings,
}

impl ClaimVerifier {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        searcher: Arc<dyn WebSearcher>,
        settings: VerifierSettings,
    ) -> Self {
        Self {
            llm,
            searcher,
            settings,
        }
    }

    pub async fn verify(&self, item: &ExtractedItem) -> VerificationOutcome {
        // Step 1: Pull out the claim and its event date
        let Some(claim) = self.extract_claim(&item.content).await else {
            return VerificationOutcome::claim_unavailable();
        };

        // Step 2: Search for evidence around the event year
        let snippets = self.search_evidence(&claim).await;
        if snippets.is_empty() {
            tracing::info!(identifier = %item.identifier, "No evidence found, skipping scoring");
            return VerificationOutcome::verification_unavailable();
        }

        // Step 3: Score the original entry against the evidence
        self.score(&item.content, &snippets)
            .await
            .unwrap_or_else(VerificationOutcome::verification_unavailable)
    }

    pub async fn extract_claim(&self, content: &str) -> Option<ClaimStatement> {
        let prompt = prompt::build_claim_prompt(content);

        let response = match self.llm.generate(&prompt, &self.settings.claim_params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Claim extraction request failed");
                return None;
            }
        };

        match extract_json_object::<ClaimStatement>(&response) {
            Ok(claim) if !claim.claim.trim().is_empty() => Some(claim),
            Ok(_) => {
                tracing::warn!("Model returned an empty claim");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse claim");
                None
            }
        }
    }

    pub async fn search_evidence(&self, claim: &ClaimStatement) -> Vec<SearchSnippet> {
        let event_year = claim.event_year();
        let radius = self.settings.search.window_radius_years;
        if let Some(window) = event_year.and_then(|year| SearchWindow::around(year, radius)) {
            tracing::debug!(
                start_year = window.start_year,
                end_year = window.end_year,
                "Searching within event window"
            );
        }

        let request = SearchRequest::for_claim(&claim.claim, event_year, &self.settings.search);

        match self.searcher.search(&request).await {
            Ok(snippets) => {
                tracing::debug!(results = snippets.len(), query = %request.query, "Search completed");
                snippets
            }
            Err(e) => {
                tracing::warn!(error = %e, query = %request.query, "Search failed");
                Vec::new()
            }
        }
    }

    pub async fn score(
        &self,
        content: &str,
        snippets: &[SearchSnippet],
    ) -> Option<VerificationOutcome> {
        let prompt = prompt::build_scoring_prompt(content, snippets);

        let response = match self.llm.generate(&prompt, &self.settings.scoring_params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Scoring request failed");
                return None;
            }
        };

        extract_json_object::<VerificationOutcome>(&response)
            .map_err(|e| tracing::warn!(error = %e, "Could not parse verification score"))
            .ok()
    }
}
