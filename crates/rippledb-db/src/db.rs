use rippledb_types::{AppendRequest, AppendResponse, PullRequest, PullResponse};

use crate::error::DbError;

/// Default `pull` limit when a caller does not specify one (spec §6 config
/// table: `pull_limit` default 500).
pub const DEFAULT_PULL_LIMIT: u32 = 500;

/// The server-side append-only log broker (spec §4.5).
///
/// Append is atomic per request: either every change in the batch lands or
/// none does. Pull is read-only, idempotent, and ordered by the broker's own
/// per-stream sequence — cross-stream ordering is undefined.
pub trait Db {
    /// Appends `request.changes` to `request.stream`'s log in the order
    /// given. If `request.idempotency_key` matches one from a prior
    /// successful append on the same stream, this is a no-op: nothing is
    /// appended and `accepted` is 0.
    fn append(
        &self,
        request: AppendRequest,
    ) -> impl Future<Output = Result<AppendResponse, DbError>> + Send;

    /// Returns up to `request.limit` (default [`DEFAULT_PULL_LIMIT`])
    /// changes with sequence strictly greater than `request.cursor`'s
    /// position, or from the start of the log if `cursor` is `None`.
    fn pull(
        &self,
        request: PullRequest,
    ) -> impl Future<Output = Result<PullResponse, DbError>> + Send;
}
