use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One relevant excerpt picked out of the fetched page.
///
/// `identifier` and `date` are passed through exactly as the model wrote them;
/// nothing downstream relies on their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    #[serde(default, alias = "entryContent", deserialize_with = "deserialize_content")]
    pub content: String,
    #[serde(default, alias = "entryNumber")]
    pub identifier: Value,
    #[serde(default, alias = "entryDate")]
    pub date: Value,
}

impl ExtractedItem {
    pub fn new(content: impl Into<String>, identifier: impl Into<Value>, date: impl Into<Value>) -> Self {
        Self {
            content: content.into(),
            identifier: identifier.into(),
            date: date.into(),
        }
    }
}

/// Null becomes empty text; any other non-string is kept as its JSON rendering.
fn deserialize_content<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
