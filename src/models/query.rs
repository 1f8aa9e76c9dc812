//! Query-related data models.
//!
//! This module defines the positional parameters handed to the executor and
//! the row shape it returns.

use serde_json::Value as JsonValue;

/// One result row: column name to decoded value, in SELECT order.
pub type JsonRow = serde_json::Map<String, JsonValue>;

/// A positional parameter for parameterized queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl QueryParam {
    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_types() {
        assert_eq!(QueryParam::Null.type_name(), "null");
        assert_eq!(QueryParam::Int(42).type_name(), "int");
        assert_eq!(QueryParam::from("users").type_name(), "string");
    }

    #[test]
    fn test_query_param_from_owned_string() {
        let table = String::from("orders");
        assert_eq!(
            QueryParam::from(table),
            QueryParam::String("orders".to_string())
        );
    }
}
