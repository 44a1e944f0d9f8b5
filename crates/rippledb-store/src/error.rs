use thiserror::Error;

use rippledb_types::ValidationError;

/// Errors raised by a `Store` (spec §4.4, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A batch passed to `apply_changes` contained a malformed `Change`.
    /// The whole batch is rejected; no partial apply, no events fired.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An operation was attempted after the store's event bus was shut
    /// down (e.g. during an orderly drain at process exit).
    #[error("store is closed")]
    Closed,
}
