use extract::ExtractedItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use verify::VerificationOutcome;

/// One verified item as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub identifier: Value,
    pub date: Value,
    pub content: String,
    pub verification: VerificationOutcome,
}

impl ResultEntry {
    pub fn new(item: ExtractedItem, verification: VerificationOutcome) -> Self {
        Self {
            identifier: item.identifier,
            date: item.date,
            content: item.content,
            verification,
        }
    }
}

/// Shape verified pairs into result entries, keeping extraction order.
pub fn aggregate(verified: Vec<(ExtractedItem, VerificationOutcome)>) -> Vec<ResultEntry> {
    verified
        .into_iter()
        .map(|(item, outcome)| ResultEntry::new(item, outcome))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_and_count_preserved() {
        let verified = vec![
            (ExtractedItem::new("a", 1, "01.01.2020"), VerificationOutcome::claim_unavailable()),
            (ExtractedItem::new("b", 2, "02.01.2020"), VerificationOutcome::verification_unavailable()),
        ];
        let entries = aggregate(verified);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "a");
        assert_eq!(entries[1].identifier, json!(2));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = ResultEntry::new(
            ExtractedItem::new("text", 7, "05.05.2015"),
            VerificationOutcome::claim_unavailable(),
        );
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["identifier"], 7);
        assert_eq!(json["date"], "05.05.2015");
        assert_eq!(json["verification"]["confidenceScore"], 0);
        assert_eq!(json["verification"]["summary"], "claim could not be extracted");
    }
}
