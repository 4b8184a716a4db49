use crate::search::SearchSnippet;

pub fn build_claim_prompt(content: &str) -> String {
    format!(
        r#"Analyze this entry:

"{}"

What is the main claim in this entry, and what is the EVENT DATE of that claim? Answer in this JSON format:

{{
  "claim": "the main claim",
  "eventDate": "YYYY-MM-DD"
}}

Note: the event date is the date of the event the entry talks about, not the date the entry was written. If there is no exact date, give the closest year or period.

Respond ONLY in JSON."#,
        content
    )
}

/// Numbered source list: `N. title`, then the excerpt and link indented.
pub fn format_sources(snippets: &[SearchSnippet]) -> String {
    snippets
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}. {}\n   {}\n   Source: {}",
                i + 1,
                s.title,
                s.excerpt,
                s.source_link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_scoring_prompt(content: &str, snippets: &[SearchSnippet]) -> String {
    format!(
        r#"You are a fact-checker. The original claim is:

"{}"

I found these sources from that period to support or refute the claim:

{}

Based on these sources, how accurate is the original claim? Give a confidence score between 0 and 100, write a short verification summary of your findings, and list any additional notes (contradictions, points you are unsure about).

Answer in this JSON format:

{{
  "confidenceScore": 85,
  "summary": "short summary",
  "notes": "additional notes"
}}

Respond ONLY in JSON."#,
        content,
        format_sources(snippets)
    )
}
