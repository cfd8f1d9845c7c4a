//! Chart definition parsing
//!
//! The generation service returns chart definitions as serialized JSON text.
//! This module turns that text into a [`ChartOption`] that a renderer can
//! consume, and prepares definitions for the card list where the embedded
//! title is redundant with the card header.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TITLE_KEY: &str = "title";

/// Structured, renderable chart description (series, axes, type, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartOption(Map<String, Value>);

impl ChartOption {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Embedded title block, if the generator produced one
    pub fn title(&self) -> Option<&Value> {
        self.0.get(TITLE_KEY)
    }

    /// Remove the embedded title
    pub fn clear_title(&mut self) {
        self.0.remove(TITLE_KEY);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// Parse a raw chart definition
///
/// `None`, empty and whitespace-only input mean "no chart yet" and yield
/// `Ok(None)`. Anything else must be a JSON object.
pub fn parse(raw: Option<&str>) -> Result<Option<ChartOption>> {
    let raw = match raw {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Ok(None),
    };

    let value: Value =
        serde_json::from_str(raw).map_err(|e| AppError::ChartParse(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(Some(ChartOption(fields))),
        other => Err(AppError::ChartParse(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

/// Prepare a definition for the card list: parse, drop the title, re-serialize
pub fn for_list_view(raw: Option<&str>) -> Result<Option<String>> {
    match parse(raw)? {
        Some(mut option) => {
            option.clear_title();
            Ok(Some(option.to_json_string()?))
        }
        None => Ok(None),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const LINE_CHART: &str = r#"{
        "title": {"text": "User growth"},
        "xAxis": {"type": "category", "data": ["1", "2", "3"]},
        "yAxis": {"type": "value"},
        "series": [{"data": [10, 20, 30], "type": "line"}]
    }"#;

    #[test]
    fn test_parse_missing_is_no_chart() {
        assert!(parse(None).unwrap().is_none());
        assert!(parse(Some("")).unwrap().is_none());
        assert!(parse(Some("   \n")).unwrap().is_none());
    }

    #[test]
    fn test_parse_valid_object() {
        let option = parse(Some(LINE_CHART)).unwrap().unwrap();
        assert_eq!(option.title(), Some(&json!({"text": "User growth"})));
        assert_eq!(option.get("series").unwrap()[0]["type"], "line");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = parse(Some("{series: [}")).unwrap_err();
        assert!(matches!(err, AppError::ChartParse(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        for raw in ["null", "42", "[1, 2]", "\"line\""] {
            let err = parse(Some(raw)).unwrap_err();
            assert!(matches!(err, AppError::ChartParse(_)), "{raw} should fail");
        }
    }

    #[test]
    fn test_list_view_drops_title() {
        let stripped = for_list_view(Some(LINE_CHART)).unwrap().unwrap();
        let option = parse(Some(&stripped)).unwrap().unwrap();
        assert!(option.title().is_none());
        assert!(option.get("xAxis").is_some());
    }

    #[test]
    fn test_list_view_keeps_missing_chart_missing() {
        assert_eq!(for_list_view(None).unwrap(), None);
        assert!(for_list_view(Some("not json")).is_err());
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
        ]
    }

    fn json_object() -> impl Strategy<Value = Map<String, Value>> {
        let value = json_leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("[a-zA-Z]{1,8}", value, 0..6)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_parse_reads_back_serialized_objects(fields in json_object()) {
            let raw = serde_json::to_string(&fields).unwrap();
            let parsed = parse(Some(&raw)).unwrap().unwrap();
            prop_assert_eq!(parsed, ChartOption::new(fields));
        }

        #[test]
        fn prop_list_view_never_has_title(
            mut fields in json_object(),
            with_title in any::<bool>(),
        ) {
            if with_title {
                fields.insert("title".to_string(), json!({"text": "generated"}));
            }
            let raw = serde_json::to_string(&fields).unwrap();
            let stripped = for_list_view(Some(&raw)).unwrap().unwrap();
            let parsed = parse(Some(&stripped)).unwrap().unwrap();
            prop_assert!(parsed.title().is_none());
        }

        #[test]
        fn prop_parse_never_panics(raw in ".{0,64}") {
            let _ = parse(Some(&raw));
        }
    }
}
