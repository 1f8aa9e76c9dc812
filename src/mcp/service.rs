//! MCP service implementation using rmcp.
//!
//! `PgService` answers `initialize`, `tools/list` and `tools/call`. Tool
//! metadata comes from the [`ToolRegistry`]; calls are handed to the
//! [`ToolDispatcher`].

use crate::db::QueryExecutor;
use crate::tools::{ToolDispatcher, ToolRegistry};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const SERVER_NAME: &str = "pg-simple-mcp";

pub struct PgService<E> {
    registry: Arc<ToolRegistry>,
    dispatcher: Arc<ToolDispatcher<E>>,
}

impl<E: QueryExecutor> PgService<E> {
    /// Create a service over the given executor.
    pub fn new(executor: Arc<E>) -> Self {
        Self {
            registry: Arc::new(ToolRegistry::new()),
            dispatcher: Arc::new(ToolDispatcher::new(executor)),
        }
    }

    /// Tools in advertised order.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry.to_tools()
    }

    /// Run one tool call. Missing `arguments` behave like `{}`.
    pub async fn handle_call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = arguments.unwrap_or_default();
        self.dispatcher
            .invoke(name, &arguments)
            .await
            .map(Into::into)
            .map_err(Into::into)
    }
}

impl<E> Clone for PgService<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<E: QueryExecutor> ServerHandler for PgService<E> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                title: Some("PostgreSQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for a single PostgreSQL database.\n\
                \n\
                - `list_tables`: tables in the `public` schema\n\
                - `describe_table`: column names, types and nullability for `table`\n\
                - `run_sql_query`: run any SQL in `query` and get the rows back as JSON\n\
                \n\
                Database errors are returned as tool output starting with `Error:`."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        debug!("Listing tools");
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    #[instrument(skip_all, fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.handle_call(&request.name, request.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbResult;
    use crate::models::{JsonRow, QueryParam};

    struct NoRows;

    impl QueryExecutor for NoRows {
        async fn fetch_rows(&self, _sql: &str, _params: &[QueryParam]) -> DbResult<Vec<JsonRow>> {
            Ok(Vec::new())
        }
    }

    fn create_test_service() -> PgService<NoRows> {
        PgService::new(Arc::new(NoRows))
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "pg-simple-mcp");
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tools_listed_in_order() {
        let service = create_test_service();
        let names: Vec<String> = service
            .tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, ["run_sql_query", "list_tables", "describe_table"]);
    }

    #[tokio::test]
    async fn test_missing_arguments_treated_as_empty() {
        let service = create_test_service();
        let result = service.handle_call("list_tables", None).await.unwrap();
        assert_eq!(result.is_error, Some(false));

        let err = service.handle_call("run_sql_query", None).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error() {
        let service = create_test_service();
        let err = service.handle_call("nope", None).await.unwrap_err();
        assert_eq!(err.code.0, -32601);
        assert_eq!(err.message, "Unknown tool: nope");
    }
}
