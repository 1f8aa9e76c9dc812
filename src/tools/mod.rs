//! MCP tool implementations.
//!
//! - `registry`: tool names, descriptions and input schemas
//! - `dispatch`: argument validation and routing
//! - `query`: `run_sql_query`
//! - `schema`: `list_tables` and `describe_table`
//! - `format`: row serialization shared by all tools

pub mod dispatch;
pub mod format;
pub mod query;
pub mod registry;
pub mod schema;

pub use dispatch::{ToolCall, ToolDispatcher};
pub use query::{QueryToolHandler, RunSqlQueryInput};
pub use registry::{ToolDescriptor, ToolKind, ToolRegistry};
pub use schema::{DescribeTableInput, ListTablesInput, SchemaToolHandler};
