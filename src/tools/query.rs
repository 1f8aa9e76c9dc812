//! Raw SQL execution tool.
//!
//! This module implements the `run_sql_query` MCP tool. The statement text is
//! forwarded unchanged: there is no allow-list and no read-only check, so the
//! tool can do anything the configured role can.

use crate::db::QueryExecutor;
use crate::error::DbResult;
use crate::tools::format::format_rows;
use schemars::JsonSchema;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Input for the run_sql_query tool.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct RunSqlQueryInput {
    /// SQL query to run
    pub query: String,
}

/// Handler for query execution.
pub struct QueryToolHandler<E> {
    executor: Arc<E>,
}

impl<E: QueryExecutor> QueryToolHandler<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Run the statement without parameters and render every returned row.
    pub async fn run_sql_query(&self, input: RunSqlQueryInput) -> DbResult<String> {
        let start = Instant::now();
        let rows = self.executor.fetch_rows(&input.query, &[]).await?;

        info!(
            row_count = rows.len(),
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );

        format_rows(&rows)
    }
}
