//! Catalog inspection tools.
//!
//! This module implements `list_tables` and `describe_table`. Both read
//! `information_schema` with fixed statements; only the table name is ever
//! supplied by the caller, and it is always bound as a parameter.

use crate::db::QueryExecutor;
use crate::error::DbResult;
use crate::models::QueryParam;
use crate::tools::format::format_rows;
use schemars::JsonSchema;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Base tables and views of the `public` schema, by name.
pub const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables WHERE table_schema = 'public' ORDER BY table_name";

/// Columns of every table called `$1`, in any schema.
pub const DESCRIBE_TABLE_SQL: &str = "SELECT column_name, data_type, is_nullable FROM information_schema.columns WHERE table_name = $1";

/// Input for the list_tables tool (no arguments).
#[derive(Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ListTablesInput {}

/// Input for the describe_table tool.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct DescribeTableInput {
    /// Name of the table to describe
    pub table: String,
}

/// Handler for schema inspection.
pub struct SchemaToolHandler<E> {
    executor: Arc<E>,
}

impl<E: QueryExecutor> SchemaToolHandler<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    pub async fn list_tables(&self, _input: ListTablesInput) -> DbResult<String> {
        let start = Instant::now();
        let rows = self.executor.fetch_rows(LIST_TABLES_SQL, &[]).await?;

        info!(
            count = rows.len(),
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Listed tables"
        );

        format_rows(&rows)
    }

    /// An unknown table is not an error; it simply has no columns.
    pub async fn describe_table(&self, input: DescribeTableInput) -> DbResult<String> {
        let start = Instant::now();
        let params = [QueryParam::from(input.table.as_str())];
        let rows = self.executor.fetch_rows(DESCRIBE_TABLE_SQL, &params).await?;

        info!(
            table = %input.table,
            columns = rows.len(),
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Described table"
        );

        format_rows(&rows)
    }
}
