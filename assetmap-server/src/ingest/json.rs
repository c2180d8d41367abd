//! JSON upload parser

use serde_json::Value;

use crate::error::{AssetError, AssetResult};

/// Parse JSON text into asset candidates
///
/// A top-level array yields its elements; a single object is treated as a
/// one-element batch. Any other top-level value is malformed.
pub fn parse_json(text: &str) -> AssetResult<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| AssetError::MalformedInput(format!("Invalid JSON format: {}", e)))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        other => Err(AssetError::MalformedInput(format!(
            "Invalid JSON format: expected an array or object of assets, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
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
    use serde_json::json;

    #[test]
    fn test_array_yields_each_element() {
        let candidates = parse_json(
            r#"[{"address":"123 St","latitude":51.5,"longitude":-0.1},
                {"address":"456 Ave","latitude":40.7,"longitude":-74.0}]"#,
        )
        .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1]["address"], "456 Ave");
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let candidates = parse_json(r#"{"address":"x","latitude":1,"longitude":2}"#).unwrap();
        assert_eq!(
            candidates,
            vec![json!({"address": "x", "latitude": 1, "longitude": 2})]
        );
    }

    #[test]
    fn test_syntax_error_is_malformed() {
        let err = parse_json("{ invalid json }").unwrap_err();
        assert!(matches!(err, AssetError::MalformedInput(_)));
        assert!(err.to_string().contains("Invalid JSON format"));
    }

    #[test]
    fn test_scalar_top_level_is_malformed() {
        for text in ["42", "\"text\"", "null", "true"] {
            let err = parse_json(text).unwrap_err();
            assert!(matches!(err, AssetError::MalformedInput(_)), "{text}");
        }
    }

    #[test]
    fn test_empty_array_is_empty_batch() {
        assert!(parse_json("[]").unwrap().is_empty());
    }
}
