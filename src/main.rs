//! pg-simple-mcp - Main entry point.
//!
//! Serves MCP over stdio against one PostgreSQL database configured through
//! `PG_*` environment variables.

use clap::Parser;
use pg_simple_mcp::config::Config;
use pg_simple_mcp::db::DbPool;
use pg_simple_mcp::transport::StdioTransport;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the protocol.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file only fills in variables that are not already set
    dotenvy::dotenv().ok();

    let config = Config::parse();

    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    info!(
        target_db = %config.display_target(),
        "Starting pg-simple-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool = DbPool::connect_lazy(config.connect_options(), &config.pool_settings());
    let transport = StdioTransport::new(pool);

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
