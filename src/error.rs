//! Error types for the PostgreSQL MCP server.
//!
//! Two disjoint channels are modelled here:
//! - [`ToolCallError`] is raised before any SQL runs (bad arguments, unknown
//!   tool) and travels back as a JSON-RPC error.
//! - [`DbError`] is raised by the database after a well-formed request reached
//!   it; the dispatcher folds it into a tool result with `isError` set.

use rmcp::model::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    /// Displays the server's own message so clients see what PostgreSQL said.
    #[error("{message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            Self::Timeout { .. } => Some("Raise PG_ACQUIRE_TIMEOUT or PG_MAX_CONNECTIONS"),
            Self::Internal { .. } => None,
        }
    }

    /// SQLSTATE reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check PG_HOST, PG_PORT, PG_USER, PG_PASSWORD and PG_DATABASE",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::timeout("a pooled connection"),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Restart the server")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Protocol-level failure of a tool call.
///
/// These never reach the database. They are reported through the transport's
/// error object rather than as tool output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("{message}")]
    InvalidParams { message: String },

    #[error("Unknown tool: {name}")]
    MethodNotFound { name: String },
}

impl ToolCallError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    pub fn method_not_found(name: impl Into<String>) -> Self {
        Self::MethodNotFound { name: name.into() }
    }

    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParams { .. } => ErrorCode::INVALID_PARAMS,
            Self::MethodNotFound { .. } => ErrorCode::METHOD_NOT_FOUND,
        }
    }
}

impl From<ToolCallError> for rmcp::ErrorData {
    fn from(err: ToolCallError) -> Self {
        rmcp::ErrorData::new(err.code(), err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_displays_server_message() {
        let err = DbError::database(
            "syntax error at or near \"SELEC\"",
            Some("42601".to_string()),
            "Check SQL syntax",
        );
        assert_eq!(err.to_string(), "syntax error at or near \"SELEC\"");
        assert_eq!(err.sql_state(), Some("42601"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::connection("refused", "Check the server");
        assert_eq!(err.suggestion(), Some("Check the server"));
        assert!(DbError::internal("boom").suggestion().is_none());
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::Timeout { .. }));
    }

    #[test]
    fn test_pool_closed_maps_to_connection() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(err.to_string().contains("Connection pool is closed"));
    }

    #[test]
    fn test_invalid_params_maps_to_json_rpc_code() {
        let err = ToolCallError::invalid_params("Query is required");
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32602);
        assert_eq!(mcp_err.message, "Query is required");
    }

    #[test]
    fn test_method_not_found_carries_tool_name() {
        let err = ToolCallError::method_not_found("drop_everything");
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32601);
        assert!(mcp_err.message.contains("drop_everything"));
    }
}
