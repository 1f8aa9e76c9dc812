//! PostgreSQL MCP Server Library
//!
//! This library exposes a PostgreSQL database to MCP (Model Context Protocol)
//! clients through three tools: `run_sql_query`, `list_tables` and
//! `describe_table`.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, ToolCallError};
pub use mcp::PgService;
