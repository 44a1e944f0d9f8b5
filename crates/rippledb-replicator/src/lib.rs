//! # rippledb-replicator
//!
//! The outbox and the pull-apply-push replicator (spec §4.6): bridges a
//! local [`rippledb_store::Store`] to a remote log broker, keeping the
//! ordering guarantee that every sync reconciles before it pushes.

mod config;
mod cursor_store;
mod error;
mod idempotency;
mod outbox;
mod remote;
mod replicator;

pub use config::{IdempotencyKeyFn, ReplicatorConfig};
pub use cursor_store::{CursorStore, MemoryCursorStore};
pub use error::{ReplicatorError, TransportError};
pub use idempotency::default_idempotency_key;
pub use outbox::Outbox;
pub use remote::{LocalRemote, Remote};
pub use replicator::{Replicator, SyncOutcome};
