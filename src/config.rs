//! Configuration handling for the PostgreSQL MCP server.
//!
//! Connection settings come from `PG_*` environment variables (optionally
//! seeded from a `.env` file by the binary). Every setting also has a long
//! flag that overrides the environment.

use clap::Parser;
use sqlx::postgres::PgConnectOptions;
use std::time::Duration;
use thiserror::Error;

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Reported to the server as `application_name`.
pub const APPLICATION_NAME: &str = "pg-simple-mcp";

/// Startup configuration errors. Any of these aborts the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required env var: {key}")]
    MissingEnv { key: &'static str },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Connection pool settings handed to the pool collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

/// Configuration for the PostgreSQL MCP server.
#[derive(Clone, Parser)]
#[command(
    name = "pg-simple-mcp",
    about = "MCP server for PostgreSQL - run SQL, list tables and describe columns over stdio",
    version
)]
pub struct Config {
    /// Database server host
    #[arg(long, env = "PG_HOST")]
    pub pg_host: String,

    /// Database server port
    #[arg(long, env = "PG_PORT")]
    pub pg_port: u16,

    /// Role to connect as
    #[arg(long, env = "PG_USER")]
    pub pg_user: String,

    /// Password for the role
    #[arg(long, env = "PG_PASSWORD", hide_env_values = true)]
    pub pg_password: String,

    /// Database to connect to
    #[arg(long, env = "PG_DATABASE")]
    pub pg_database: String,

    /// Maximum number of pooled connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS, env = "PG_MAX_CONNECTIONS")]
    pub max_connections: u32,

    /// Seconds to wait for a free pooled connection
    #[arg(long, default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS, env = "PG_ACQUIRE_TIMEOUT")]
    pub acquire_timeout: u64,

    /// Seconds before an idle pooled connection is closed
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS, env = "PG_IDLE_TIMEOUT")]
    pub idle_timeout: u64,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Reject values clap accepts but the server cannot use.
    ///
    /// An empty required variable counts as missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("PG_HOST", &self.pg_host),
            ("PG_USER", &self.pg_user),
            ("PG_PASSWORD", &self.pg_password),
            ("PG_DATABASE", &self.pg_database),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(ConfigError::MissingEnv { key });
            }
        }

        if self.pg_port == 0 {
            return Err(ConfigError::Invalid {
                key: "PG_PORT",
                reason: "port must be between 1 and 65535".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "PG_MAX_CONNECTIONS",
                reason: "max_connections must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Build driver connect options. The password is only ever held here.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.pg_host)
            .port(self.pg_port)
            .username(&self.pg_user)
            .password(&self.pg_password)
            .database(&self.pg_database)
            .application_name(APPLICATION_NAME)
    }

    /// Pool settings derived from this configuration.
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout),
            idle_timeout: Duration::from_secs(self.idle_timeout),
        }
    }

    /// `host:port/database`, safe for logs.
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.pg_host, self.pg_port, self.pg_database)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("pg_host", &self.pg_host)
            .field("pg_port", &self.pg_port)
            .field("pg_user", &self.pg_user)
            .field("pg_password", &"****")
            .field("pg_database", &self.pg_database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Config {
        let mut args = vec![
            "pg-simple-mcp",
            "--pg-host",
            "db.internal",
            "--pg-port",
            "5433",
            "--pg-user",
            "reader",
            "--pg-password",
            "s3cret",
            "--pg-database",
            "analytics",
        ];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_required_values() {
        let config = parse(&[]);
        assert_eq!(config.pg_host, "db.internal");
        assert_eq!(config.pg_port, 5433);
        assert_eq!(config.pg_user, "reader");
        assert_eq!(config.pg_database, "analytics");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_must_be_integer() {
        let result = Config::try_parse_from([
            "pg-simple-mcp",
            "--pg-host",
            "localhost",
            "--pg-port",
            "not-a-port",
            "--pg-user",
            "u",
            "--pg-password",
            "p",
            "--pg-database",
            "d",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_required_value_is_missing() {
        let mut config = parse(&[]);
        config.pg_user = String::new();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingEnv { key: "PG_USER" })
        );
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Missing required env var: PG_USER"
        );
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut config = parse(&[]);
        config.max_connections = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "PG_MAX_CONNECTIONS",
                ..
            })
        ));
    }

    #[test]
    fn test_pool_settings_from_flags() {
        let config = parse(&["--max-connections", "4", "--acquire-timeout", "5"]);
        let settings = config.pool_settings();
        assert_eq!(settings.max_connections, 4);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_masks_password() {
        let config = parse(&[]);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("****"));
    }

    #[test]
    fn test_display_target_has_no_credentials() {
        let config = parse(&[]);
        let target = config.display_target();
        assert_eq!(target, "db.internal:5433/analytics");
        assert!(!target.contains("reader"));
    }
}
