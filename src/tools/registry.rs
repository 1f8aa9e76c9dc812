//! Tool catalog.
//!
//! The set of tools is closed: [`ToolKind`] names every one of them and the
//! [`ToolRegistry`] holds their descriptors in registration order.

use crate::tools::query::RunSqlQueryInput;
use crate::tools::schema::{DescribeTableInput, ListTablesInput};
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde_json::Value as JsonValue;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    RunSqlQuery,
    ListTables,
    DescribeTable,
}

impl ToolKind {
    /// All tools, in the order they are advertised.
    pub const ALL: [ToolKind; 3] = [
        ToolKind::RunSqlQuery,
        ToolKind::ListTables,
        ToolKind::DescribeTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::RunSqlQuery => "run_sql_query",
            ToolKind::ListTables => "list_tables",
            ToolKind::DescribeTable => "describe_table",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::RunSqlQuery => {
                "Execute a SQL query against the connected PostgreSQL database."
            }
            ToolKind::ListTables => "List all tables in the current database schema.",
            ToolKind::DescribeTable => "Describe the columns and types of a given table.",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn input_schema(self) -> Arc<JsonObject> {
        match self {
            ToolKind::RunSqlQuery => input_schema_for::<RunSqlQueryInput>(),
            ToolKind::ListTables => input_schema_for::<ListTablesInput>(),
            ToolKind::DescribeTable => input_schema_for::<DescribeTableInput>(),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static metadata for one callable tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    fn from_kind(kind: ToolKind) -> Self {
        Self {
            name: kind.name(),
            description: kind.description(),
            input_schema: kind.input_schema(),
        }
    }

    /// Wire form for `tools/list`.
    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, self.input_schema.clone())
    }
}

/// Immutable, ordered tool catalog built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: ToolKind::ALL
                .into_iter()
                .map(ToolDescriptor::from_kind)
                .collect(),
        }
    }

    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn to_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an MCP input schema from an argument struct.
///
/// Always an object schema with a `properties` map, without the
/// `$schema`/`title` noise schemars adds at the root.
pub fn input_schema_for<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    let mut object = match serde_json::to_value(&schema) {
        Ok(JsonValue::Object(map)) => map,
        _ => JsonObject::new(),
    };
    object.remove("$schema");
    object.remove("title");
    object
        .entry("type")
        .or_insert_with(|| JsonValue::String("object".to_string()));
    object
        .entry("properties")
        .or_insert_with(|| JsonValue::Object(JsonObject::new()));
    Arc::new(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_order() {
        let registry = ToolRegistry::new();
        let names: Vec<&str> = registry.list_tools().iter().map(|t| t.name).collect();
        assert_eq!(names, ["run_sql_query", "list_tables", "describe_table"]);
    }

    #[test]
    fn test_listing_is_idempotent() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.list_tools(), registry.list_tools());
        assert_eq!(ToolRegistry::new().list_tools(), registry.list_tools());
    }

    #[test]
    fn test_from_name_is_exact() {
        assert_eq!(
            ToolKind::from_name("list_tables"),
            Some(ToolKind::ListTables)
        );
        assert_eq!(ToolKind::from_name("LIST_TABLES"), None);
        assert_eq!(ToolKind::from_name(" list_tables"), None);
    }

    #[test]
    fn test_run_sql_query_schema() {
        let schema = ToolKind::RunSqlQuery.input_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["query"]["type"], json!("string"));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert!(!schema.contains_key("$schema"));
    }

    #[test]
    fn test_list_tables_schema_has_no_properties() {
        let schema = ToolKind::ListTables.input_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"], json!({}));
        assert!(
            schema
                .get("required")
                .is_none_or(|required| required == &json!([]))
        );
    }

    #[test]
    fn test_describe_table_schema() {
        let schema = ToolKind::DescribeTable.input_schema();
        assert_eq!(schema["required"], json!(["table"]));
        assert_eq!(schema["properties"]["table"]["type"], json!("string"));
    }

    #[test]
    fn test_to_tool_carries_description() {
        let registry = ToolRegistry::new();
        let tool = registry.list_tools()[2].to_tool();
        assert_eq!(tool.name, "describe_table");
        assert_eq!(
            tool.description.as_deref(),
            Some("Describe the columns and types of a given table.")
        );
    }
}
