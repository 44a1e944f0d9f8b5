use thiserror::Error;

use rippledb_types::ValidationError;

/// Errors raised by a `Db` (spec §4.5, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DbError {
    /// A `Change` in an `append` batch failed validation. The whole request
    /// is rejected; nothing is appended.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A `pull` cursor did not parse as a position this `Db` recognizes.
    #[error("cursor {cursor:?} is not valid for this log")]
    InvalidCursor { cursor: String },

    /// `append`'s `idempotency_key` was reused on this stream for a change
    /// set that does not match the batch originally accepted under that
    /// key (spec §7: "`ConflictError` … raised by `append` if the server
    /// rejects on idempotency violation").
    #[error("idempotency key {key:?} on stream {stream:?} was already used for a different batch")]
    Conflict { stream: String, key: String },
}
