//! Database access layer.
//!
//! This module provides:
//! - Connection pool management
//! - Query execution
//! - Type mappings from PostgreSQL columns to JSON

pub mod executor;
pub mod params;
pub mod pool;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::DbPool;
pub use types::RowToJson;
