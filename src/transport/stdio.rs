//! Stdio transport for the MCP server.
//!
//! This transport uses standard input/output for communication,
//! which is the standard mode for CLI-based MCP integrations.

use crate::db::DbPool;
use crate::error::{DbError, DbResult};
use crate::mcp::PgService;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Stdio transport implementation.
///
/// Reads JSON-RPC messages from stdin and writes responses to stdout.
/// Nothing else may write to stdout while it runs.
pub struct StdioTransport {
    pool: DbPool,
}

impl StdioTransport {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn name(&self) -> &'static str {
        "stdio"
    }

    /// Serve until stdin closes or a shutdown signal arrives, then close the
    /// pool.
    pub async fn run(&self) -> DbResult<()> {
        let service = PgService::new(Arc::new(self.pool.clone()));

        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        info!("pg-simple-mcp running on stdio");

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(quit_reason) => {
                        info!(reason = ?quit_reason, "Stdio transport completed");
                    }
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.pool.close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Closing database pool");
        self.pool.close().await;

        if shutdown_requested {
            // The stdin reader may still be blocked; select! cannot interrupt it
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// If a handler cannot be installed, that signal is simply never observed.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
