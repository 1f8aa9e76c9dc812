//! Transport layer for the MCP server.
//!
//! The server speaks MCP over stdio only.

pub mod stdio;

pub use stdio::StdioTransport;
