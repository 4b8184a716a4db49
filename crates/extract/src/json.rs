//! Best-effort recovery of JSON embedded in model prose.
//!
//! Models wrap their JSON in explanations, code fences or trailing notes. The
//! first attempt mirrors a plain pattern match (first opener to last closer);
//! when that span does not deserialize, the balanced span starting at the first
//! opener is tried instead.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use thiserror::Error;

static ARRAY_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());
static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

#[derive(Debug, Error)]
pub enum JsonExtractError {
    #[error("no JSON {0} found in model output")]
    NotFound(&'static str),

    #[error("malformed JSON in model output: {0}")]
    Malformed(#[source] serde_json::Error),
}

#[derive(Clone, Copy)]
enum Shape {
    Array,
    Object,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Shape::Array => ('[', ']'),
            Shape::Object => ('{', '}'),
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Shape::Array => &ARRAY_SPAN,
            Shape::Object => &OBJECT_SPAN,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }
}

/// Deserialize the first JSON array found in `text`.
pub fn extract_json_array<T: DeserializeOwned>(text: &str) -> Result<T, JsonExtractError> {
    extract(text, Shape::Array)
}

/// Deserialize the first JSON object found in `text`.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Result<T, JsonExtractError> {
    extract(text, Shape::Object)
}

fn extract<T: DeserializeOwned>(text: &str, shape: Shape) -> Result<T, JsonExtractError> {
    let greedy = shape
        .pattern()
        .find(text)
        .ok_or(JsonExtractError::NotFound(shape.name()))?
        .as_str();

    let err = match serde_json::from_str(greedy) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    match balanced_span(text, shape) {
        Some(span) if span != greedy => {
            serde_json::from_str(span).map_err(JsonExtractError::Malformed)
        }
        _ => Err(JsonExtractError::Malformed(err)),
    }
}

/// The span from the first opener to its matching closer, skipping delimiters
/// inside string literals.
fn balanced_span(text: &str, shape: Shape) -> Option<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}
