use thiserror::Error;

use rippledb_store::StoreError;

/// A failure talking to the remote log broker (spec §7): network failure,
/// a boxed [`rippledb_db::DbError`](rippledb_db::DbError) from an in-process
/// remote, or anything else a transport adapter wants to surface.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

// Manual `PartialEq`/`Clone` are not derivable over `dyn Error`; replicator
// errors are compared by their `Display` string in tests instead.
impl PartialEq for TransportError {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_string() == other.0.to_string()
    }
}

/// Errors raised by a [`Replicator`](crate::Replicator) (spec §4.6, §7).
#[derive(Debug, Error)]
pub enum ReplicatorError {
    /// The local store rejected a batch during `push_local` or during the
    /// apply half of `sync`.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// `remote.pull` or `remote.append` failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// `sync()` was called while a previous call on the same replicator was
    /// still in flight (spec §5: "two concurrent `sync()` invocations on
    /// the same replicator are serialized... MUST reject overlapping syncs
    /// or queue them" — this implementation rejects).
    #[error("a sync is already in progress on this replicator")]
    SyncInProgress,
}

impl PartialEq for ReplicatorError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::Transport(a), Self::Transport(b)) => a == b,
            (Self::SyncInProgress, Self::SyncInProgress) => true,
            _ => false,
        }
    }
}
