//! JSON snapshot implementation of [`UnitData`].
//!
//! The coordinator hands the agent one JSON document per unit holding the
//! `wu`, `assignment`, and `request` sections. This wraps that document and
//! resolves dotted-path lookups against it.

use serde_json::Value;

use super::{Result, UnitData};

/// Path-addressed reader over a `serde_json::Value` snapshot.
#[derive(Debug, Clone)]
pub struct JsonData {
    root: Value,
}

impl JsonData {
    /// Wrap an already-parsed snapshot.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a snapshot from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// Walk a dotted path through nested objects.
    fn select(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |value, key| value.get(key))
    }
}

impl UnitData for JsonData {
    fn optional_u64(&self, path: &str) -> Option<u64> {
        let value = self.select(path)?;
        match value {
            Value::Number(n) => n.as_u64(),
            // Some coordinator fields arrive as quoted numbers
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn optional_str(&self, path: &str) -> Option<&str> {
        self.select(path)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> JsonData {
        JsonData::new(json!({
            "wu": {"estimate": 1000},
            "assignment": {
                "timeout": 5000,
                "deadline": "10000",
                "credit": 2000,
            },
            "request": {"time": "1970-01-02T00:00:00Z"},
        }))
    }

    #[test]
    fn test_nested_lookup() {
        let data = snapshot();
        assert_eq!(data.optional_u64("wu.estimate"), Some(1000));
        assert_eq!(data.u64_or("assignment.timeout", 86_400), 5000);
    }

    #[test]
    fn test_missing_path_defaults() {
        let data = snapshot();
        assert_eq!(data.optional_u64("wu.frames"), None);
        assert_eq!(data.u64_or("assignment.missing", 7), 7);
        assert_eq!(data.optional_str("request.missing"), None);
        assert_eq!(data.timestamp("request.missing"), 0);
    }

    #[test]
    fn test_numeric_string_leniency() {
        let data = snapshot();
        assert_eq!(data.optional_u64("assignment.deadline"), Some(10_000));
    }

    #[test]
    fn test_wrong_type_defaults() {
        let data = JsonData::new(json!({"wu": {"estimate": [1, 2]}}));
        assert_eq!(data.optional_u64("wu.estimate"), None);
        assert_eq!(data.u64_or("wu.estimate", 42), 42);
        // Traversing through a non-object is a miss, not a panic
        assert_eq!(data.optional_u64("wu.estimate.deep"), None);
    }

    #[test]
    fn test_timestamp_parsing() {
        let data = snapshot();
        assert_eq!(data.timestamp("request.time"), 86_400);

        let bad = JsonData::new(json!({"request": {"time": "soon"}}));
        assert_eq!(bad.timestamp("request.time"), 0);
    }

    #[test]
    fn test_parse_text() {
        let data = JsonData::parse(r#"{"assignment":{"credit":12}}"#).unwrap();
        assert_eq!(data.optional_u64("assignment.credit"), Some(12));

        assert!(JsonData::parse("{not json").is_err());
    }
}
