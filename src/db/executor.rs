//! Query execution seam.
//!
//! Tool handlers only ever talk to a [`QueryExecutor`]. The live
//! implementation is [`DbPool`](crate::db::DbPool); tests substitute an
//! in-memory double.

use crate::error::DbResult;
use crate::models::{JsonRow, QueryParam};
use std::future::Future;

/// Something that can run SQL and hand back decoded rows.
pub trait QueryExecutor: Send + Sync + 'static {
    /// Run `sql` with positional `params` and return every row.
    ///
    /// An empty `params` slice sends the text as-is (several statements are
    /// allowed). Otherwise `params[i]` binds to `$i+1`.
    fn fetch_rows(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> impl Future<Output = DbResult<Vec<JsonRow>>> + Send;
}
