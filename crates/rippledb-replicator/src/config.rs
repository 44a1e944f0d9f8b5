use std::sync::Arc;

use rippledb_types::Change;

use crate::idempotency::default_idempotency_key;

/// Override for generating an `append` idempotency key from a drained
/// outbox batch (spec §6 config table: `idempotency_key_fn`).
pub type IdempotencyKeyFn = Arc<dyn Fn(&[Change]) -> String + Send + Sync>;

/// Configuration for a [`Replicator`](crate::Replicator) (spec §6).
#[derive(Clone)]
pub struct ReplicatorConfig {
    /// Routing key for pull/append.
    pub stream: String,
    /// Max changes per pull (default 500).
    pub pull_limit: u32,
    /// Generator for the append idempotency key of a drained batch.
    pub idempotency_key_fn: IdempotencyKeyFn,
}

impl ReplicatorConfig {
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            pull_limit: rippledb_db::DEFAULT_PULL_LIMIT,
            idempotency_key_fn: Arc::new(default_idempotency_key),
        }
    }

    #[must_use]
    pub fn with_pull_limit(mut self, pull_limit: u32) -> Self {
        self.pull_limit = pull_limit;
        self
    }

    #[must_use]
    pub fn with_idempotency_key_fn(mut self, idempotency_key_fn: IdempotencyKeyFn) -> Self {
        self.idempotency_key_fn = idempotency_key_fn;
        self
    }
}
