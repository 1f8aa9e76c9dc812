//! Connection pool management.
//!
//! A single `PgPool` backs every tool call. It is built lazily: no
//! connection is opened until the first query asks for one.

use crate::config::PoolSettings;
use crate::db::executor::QueryExecutor;
use crate::db::params::bind_postgres_param;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{JsonRow, QueryParam};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use std::time::Instant;
use tracing::{debug, info};

/// Shared PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    /// Build a pool that dials on demand.
    pub fn connect_lazy(options: PgConnectOptions, settings: &PoolSettings) -> Self {
        info!(
            host = %options.get_host(),
            port = options.get_port(),
            database = ?options.get_database(),
            max_connections = settings.max_connections,
            "Creating PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(Some(settings.idle_timeout))
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Underlying sqlx pool.
    pub fn inner(&self) -> &PgPool {
        &self.pool
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    async fn fetch_pg_rows(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<PgRow>, sqlx::Error> {
        // Without params, use the simple protocol so multi-statement text works
        if params.is_empty() {
            use sqlx::Executor;
            self.pool.fetch_all(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_postgres_param(query, param);
            }
            query.fetch_all(&self.pool).await
        }
    }
}

impl QueryExecutor for DbPool {
    async fn fetch_rows(&self, sql: &str, params: &[QueryParam]) -> DbResult<Vec<JsonRow>> {
        let start = Instant::now();
        debug!(
            sql = %sql,
            params = ?params.iter().map(QueryParam::type_name).collect::<Vec<_>>(),
            "Executing query"
        );

        let rows = self
            .fetch_pg_rows(sql, params)
            .await
            .map_err(map_query_error)?;

        let columns = rows.first().map(|r| r.column_names().len()).unwrap_or(0);
        let json_rows: Vec<JsonRow> = rows.iter().map(|r| r.to_json_map()).collect();

        debug!(
            rows = json_rows.len(),
            columns,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query complete"
        );
        Ok(json_rows)
    }
}

/// Transport-level failures get a connection hint; everything else keeps the
/// server's own error.
fn map_query_error(err: sqlx::Error) -> DbError {
    let transport_level = match &err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => true,
        // invalid_password
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("28P01"),
        _ => false,
    };

    if transport_level {
        DbError::connection(err.to_string(), connection_suggestion(&err))
    } else {
        DbError::from(err)
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return "Check that the PostgreSQL server is running and PG_HOST/PG_PORT are correct"
            .to_string();
    }

    if error_str.contains("authentication") || error_str.contains("password") {
        return "Verify PG_USER and PG_PASSWORD".to_string();
    }

    if error_str.contains("does not exist") {
        return "Check that PG_DATABASE names an existing database".to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration or build with a TLS feature".to_string();
    }

    "Verify PG_HOST, PG_PORT, PG_USER, PG_PASSWORD and PG_DATABASE".to_string()
}
