pub fn build_extraction_prompt(page_text: &str, query: &str) -> String {
    format!(
        r#"Below is a block of text taken from a discussion page:

{}

The user is looking for: "{}"

Find ONLY the entries in this text that answer this question or are directly related to it. Ignore everything else.

For every relevant entry, return a JSON list in exactly this format:

[
  {{
    "content": "full text of the entry",
    "identifier": 12345,
    "date": "DD.MM.YYYY"
  }}
]

RULES:
- "content" must be the entry's text as written
- "identifier" is the entry's number on the page
- "date" is the date the entry was written
- If nothing is relevant, return []
- Respond ONLY with JSON. Do not add any explanation."#,
        page_text, query
    )
}
