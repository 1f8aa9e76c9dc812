//! Tool call dispatch.
//!
//! A call is first turned into a typed [`ToolCall`]. Unknown names and
//! missing arguments stop there as [`ToolCallError`]s, before any SQL runs.
//! Once a handler has been reached, every failure is folded into a
//! [`ToolResult`] with `is_error` set.

use crate::db::QueryExecutor;
use crate::error::ToolCallError;
use crate::models::ToolResult;
use crate::tools::query::{QueryToolHandler, RunSqlQueryInput};
use crate::tools::registry::ToolKind;
use crate::tools::schema::{DescribeTableInput, ListTablesInput, SchemaToolHandler};
use rmcp::model::JsonObject;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, error};

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    RunSqlQuery(RunSqlQueryInput),
    ListTables(ListTablesInput),
    DescribeTable(DescribeTableInput),
}

impl ToolCall {
    /// Resolve `name` and check its required arguments.
    ///
    /// Keys a tool does not know are ignored.
    pub fn parse(name: &str, arguments: &JsonObject) -> Result<Self, ToolCallError> {
        let kind =
            ToolKind::from_name(name).ok_or_else(|| ToolCallError::method_not_found(name))?;

        match kind {
            ToolKind::RunSqlQuery => Ok(ToolCall::RunSqlQuery(RunSqlQueryInput {
                query: required_string(arguments, "query", "Query is required")?,
            })),
            ToolKind::ListTables => Ok(ToolCall::ListTables(ListTablesInput {})),
            ToolKind::DescribeTable => Ok(ToolCall::DescribeTable(DescribeTableInput {
                table: required_string(arguments, "table", "Table name is required")?,
            })),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::RunSqlQuery(_) => ToolKind::RunSqlQuery,
            ToolCall::ListTables(_) => ToolKind::ListTables,
            ToolCall::DescribeTable(_) => ToolKind::DescribeTable,
        }
    }
}

/// Fetch a required string argument.
///
/// Absent, `null`, `false`, `0` and `""` all count as missing. Any other
/// non-string value is rejected as well.
fn required_string(
    arguments: &JsonObject,
    key: &str,
    missing_message: &str,
) -> Result<String, ToolCallError> {
    match arguments.get(key) {
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => {
            Err(ToolCallError::invalid_params(missing_message))
        }
        Some(JsonValue::Number(n)) if n.as_f64() == Some(0.0) => {
            Err(ToolCallError::invalid_params(missing_message))
        }
        Some(JsonValue::String(s)) if s.is_empty() => {
            Err(ToolCallError::invalid_params(missing_message))
        }
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(ToolCallError::invalid_params(format!(
            "Argument '{}' must be a string, got {}",
            key,
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Routes tool calls to their handlers.
pub struct ToolDispatcher<E> {
    query: QueryToolHandler<E>,
    schema: SchemaToolHandler<E>,
}

impl<E: QueryExecutor> ToolDispatcher<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self {
            query: QueryToolHandler::new(executor.clone()),
            schema: SchemaToolHandler::new(executor),
        }
    }

    /// Invoke a tool by name.
    ///
    /// `Err` is reserved for calls that never reached a handler. Database
    /// failures come back as `Ok` with an `Error: ...` text and `is_error`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: &JsonObject,
    ) -> Result<ToolResult, ToolCallError> {
        let call = ToolCall::parse(name, arguments)?;
        let kind = call.kind();
        debug!(tool = %kind, "Dispatching tool call");

        let outcome = match call {
            ToolCall::RunSqlQuery(input) => self.query.run_sql_query(input).await,
            ToolCall::ListTables(input) => self.schema.list_tables(input).await,
            ToolCall::DescribeTable(input) => self.schema.describe_table(input).await,
        };

        match outcome {
            Ok(text) => Ok(ToolResult::text(text)),
            Err(e) => {
                error!(
                    tool = %kind,
                    error = %e,
                    sql_state = ?e.sql_state(),
                    suggestion = ?e.suggestion(),
                    "Tool execution failed"
                );
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}
