pub mod json;
pub mod llm;
pub mod prompt;
pub mod schema;

pub use json::{JsonExtractError, extract_json_array, extract_json_object};
pub use llm::{GeminiClient, GenerationParams, TextGenerator};
pub use schema::ExtractedItem;

use std::sync::Arc;

/// Picks the excerpts of a page that are relevant to a user query.
#[derive(Clone)]
pub struct ClaimExtractor {
    llm: Arc<dyn TextGenerator>,
    params: GenerationParams,
}

impl ClaimExtractor {
    pub fn new(llm: Arc<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self { llm, params }
    }

    /// Extract relevant items from page text, in the order the model lists them.
    ///
    /// Never fails: a model error or an unparseable answer yields an empty list.
    pub async fn extract(&self, text: &str, query: &str) -> Vec<ExtractedItem> {
        let prompt = prompt::build_extraction_prompt(text, query);

        let response = match self.llm.generate(&prompt, &self.params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Relevant entry extraction failed");
                return Vec::new();
            }
        };

        match extract_json_array::<Vec<ExtractedItem>>(&response) {
            Ok(items) => {
                tracing::info!(items = items.len(), "Extracted relevant entries");
                items
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse relevant entries");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedGenerator(Result<String, String>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            self.0.clone().map_err(anyhow::Error::msg)
        }
    }

    fn extractor(reply: Result<&str, &str>) -> ClaimExtractor {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        ClaimExtractor::new(
            Arc::new(FixedGenerator(reply)),
            GenerationParams::new(0.2, 8192),
        )
    }

    #[tokio::test]
    async fn test_extracts_items_in_order() {
        let reply = r#"Sure:
[
  {"content": "first", "identifier": 1, "date": "01.01.2020"},
  {"content": "second", "identifier": 2, "date": "02.01.2020"}
]"#;
        let items = extractor(Ok(reply)).extract("page", "query").await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, "first");
        assert_eq!(items[1].identifier, 2);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_empty() {
        let items = extractor(Ok("Nothing relevant here.")).extract("page", "query").await;
        assert!(items.is_empty());

        let items = extractor(Ok("[{\"content\": \"cut off")).extract("page", "query").await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_garbled_content_keeps_item() {
        let reply = r#"[
  {"content": null, "identifier": 1, "date": "01.01.2020"},
  {"content": "real", "identifier": 2, "date": "02.01.2020"}
]"#;
        let items = extractor(Ok(reply)).extract("page", "query").await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, "");
        assert_eq!(items[1].content, "real");
    }

    #[tokio::test]
    async fn test_model_error_is_empty() {
        let items = extractor(Err("503")).extract("page", "query").await;
        assert!(items.is_empty());
    }
}
