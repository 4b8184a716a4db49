use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").unwrap());

/// The core assertion of an item and the date of the event it talks about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatement {
    pub claim: String,
    #[serde(default)]
    pub event_date: Value,
}

impl ClaimStatement {
    /// Year of the event, read from `YYYY-MM-DD`, a bare year or the first
    /// four-digit run in free text.
    pub fn event_year(&self) -> Option<i32> {
        match &self.event_date {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => YEAR
                .captures(s)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            _ => None,
        }
    }
}

/// Credibility verdict for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    #[serde(deserialize_with = "deserialize_score")]
    pub confidence_score: u8,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub notes: String,
}

impl VerificationOutcome {
    /// Substituted when no claim could be read out of the item.
    pub fn claim_unavailable() -> Self {
        Self {
            confidence_score: 0,
            summary: "claim could not be extracted".to_string(),
            notes: "the main assertion could not be identified in the entry".to_string(),
        }
    }

    /// Substituted when there was no evidence to score or the score was unreadable.
    pub fn verification_unavailable() -> Self {
        Self {
            confidence_score: 0,
            summary: "verification could not be completed".to_string(),
            notes: "not enough sources were found".to_string(),
        }
    }
}

/// Accepts `85`, `85.4` or `"85"` and clamps into 0..=100.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(score) if score.is_finite() => Ok(score.round().clamp(0.0, 100.0) as u8),
        _ => Err(D::Error::custom("confidenceScore must be a number")),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
