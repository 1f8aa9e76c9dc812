//! Output formatting for tool results.
//!
//! Every successful tool call answers with its rows as a pretty-printed JSON
//! array (two-space indent), columns in SELECT order.

use crate::error::{DbError, DbResult};
use crate::models::JsonRow;

/// Serialize rows as the text body of a tool result.
pub fn format_rows(rows: &[JsonRow]) -> DbResult<String> {
    serde_json::to_string_pretty(rows)
        .map_err(|e| DbError::internal(format!("Failed to serialize rows: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};

    fn row(pairs: &[(&str, JsonValue)]) -> JsonRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_result_is_empty_array() {
        assert_eq!(format_rows(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_two_space_indent() {
        let rows = vec![row(&[("id", json!(1)), ("name", json!("a"))])];
        let text = format_rows(&rows).unwrap();
        assert_eq!(text, "[\n  {\n    \"id\": 1,\n    \"name\": \"a\"\n  }\n]");
    }

    #[test]
    fn test_column_order_is_preserved() {
        let rows = vec![row(&[
            ("zeta", json!(1)),
            ("alpha", json!(2)),
            ("mid", json!(null)),
        ])];
        let text = format_rows(&rows).unwrap();
        let zeta = text.find("zeta").unwrap();
        let alpha = text.find("alpha").unwrap();
        let mid = text.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid);

        let parsed: Vec<JsonRow> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, rows);
        let keys: Vec<&String> = parsed[0].keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }
}
