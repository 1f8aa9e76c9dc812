//! Data models for the PostgreSQL MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod query;
pub mod tool;

// Re-export commonly used types
pub use query::{JsonRow, QueryParam};
pub use tool::{ContentBlock, ToolResult};
