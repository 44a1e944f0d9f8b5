use tokio::sync::Mutex;
use tracing::info;

use rippledb_store::Store;
use rippledb_types::{AppendRequest, Change, PullRequest};

use crate::config::ReplicatorConfig;
use crate::cursor_store::CursorStore;
use crate::error::{ReplicatorError, TransportError};
use crate::outbox::Outbox;
use crate::remote::Remote;

/// Result of one `sync()` cycle (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub next_cursor: Option<String>,
    pub pulled: u32,
    pub pushed: u32,
}

/// Binds a local [`Store`] to a remote log broker via an [`Outbox`] and a
/// [`CursorStore`] (spec §4.6).
pub struct Replicator<S, R, C> {
    store: S,
    remote: R,
    outbox: Outbox,
    cursor_store: C,
    config: ReplicatorConfig,
    // Guards against overlapping `sync()` calls (spec §5). Held only for
    // the duration of one sync; `try_lock` turns an overlap into
    // `ReplicatorError::SyncInProgress` instead of blocking the caller.
    sync_guard: Mutex<()>,
}

impl<S, R, C> Replicator<S, R, C>
where
    S: Store,
    R: Remote,
    C: CursorStore,
{
    pub fn new(store: S, remote: R, cursor_store: C, config: ReplicatorConfig) -> Self {
        Self {
            store,
            remote,
            outbox: Outbox::new(),
            cursor_store,
            config,
            sync_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Applies `change` to the local store, then enqueues it in the
    /// outbox. The local apply happens first so the UI reflects the write
    /// immediately; if it fails, nothing is enqueued (spec §4.6).
    pub async fn push_local(&self, change: Change) -> Result<(), ReplicatorError> {
        self.store
            .apply_changes(vec![change.clone()])
            .await?;
        self.outbox.push(&self.config.stream, change).await;
        Ok(())
    }

    /// Runs one pull-then-apply-then-push cycle (spec §4.6).
    pub async fn sync(&self) -> Result<SyncOutcome, ReplicatorError> {
        let _guard = self
            .sync_guard
            .try_lock()
            .map_err(|_| ReplicatorError::SyncInProgress)?;

        let cursor = self
            .cursor_store
            .load(&self.config.stream)
            .await
            .map_err(TransportError::new)?;

        let pulled = self
            .remote
            .pull(PullRequest {
                stream: self.config.stream.clone(),
                cursor,
                limit: Some(self.config.pull_limit),
            })
            .await?;
        let pulled_count = pulled.changes.len() as u32;

        if !pulled.changes.is_empty() {
            self.store.apply_changes(pulled.changes).await?;
            self.cursor_store
                .save(&self.config.stream, pulled.next_cursor.clone())
                .await
                .map_err(TransportError::new)?;
        }

        let pending = self.outbox.drain(&self.config.stream).await;
        let pushed = if pending.is_empty() {
            0
        } else {
            let idempotency_key = (self.config.idempotency_key_fn)(&pending);
            match self
                .remote
                .append(AppendRequest {
                    stream: self.config.stream.clone(),
                    idempotency_key: Some(idempotency_key),
                    changes: pending.clone(),
                })
                .await
            {
                Ok(response) => response.accepted,
                Err(error) => {
                    self.outbox.requeue_front(&self.config.stream, pending).await;
                    return Err(error.into());
                }
            }
        };

        info!(
            stream = %self.config.stream,
            pulled = pulled_count,
            pushed,
            "sync cycle complete"
        );

        Ok(SyncOutcome {
            next_cursor: pulled.next_cursor,
            pulled: pulled_count,
            pushed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rippledb_db::InMemoryDb;
    use rippledb_hlc::Hlc;
    use rippledb_store::MemoryStore;
    use rippledb_types::MakeUpsert;
    use std::collections::HashMap;

    fn upsert(entity_id: &str, title: &str, wall: u64, node: &str) -> Change {
        Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "todo".into(),
            entity_id: entity_id.into(),
            patch: HashMap::from([("title".to_string(), serde_json::json!(title))]),
            hlc: Hlc::new(wall, 0, node),
        })
    }

    fn replicator(
        db: InMemoryDb,
    ) -> Replicator<MemoryStore, crate::LocalRemote<InMemoryDb>, crate::MemoryCursorStore> {
        Replicator::new(
            MemoryStore::new(),
            crate::LocalRemote::new(db),
            crate::MemoryCursorStore::new(),
            ReplicatorConfig::new("s"),
        )
    }

    #[tokio::test]
    async fn create_then_replicate() {
        let db = InMemoryDb::new();
        let a = replicator(db.clone());
        let b = replicator(db);

        a.push_local(upsert("1", "hello", 1000, "a")).await.unwrap();
        a.sync().await.unwrap();
        b.sync().await.unwrap();

        let row = b.store().get_row("todo", "1").await.unwrap().unwrap();
        assert_eq!(row["title"], serde_json::json!("hello"));
    }

    #[tokio::test]
    async fn concurrent_sync_on_the_same_replicator_is_rejected() {
        let db = InMemoryDb::new();
        let replicator = replicator(db);
        let _guard = replicator.sync_guard.lock().await;
        let err = replicator.sync().await.unwrap_err();
        assert_eq!(err, ReplicatorError::SyncInProgress);
    }

    #[tokio::test]
    async fn idempotent_push_retry_is_a_safe_noop_on_the_server() {
        let db = InMemoryDb::new();
        let fixed_key: crate::IdempotencyKeyFn =
            std::sync::Arc::new(|_changes: &[Change]| "fixed-key".to_string());
        let replicator = Replicator::new(
            MemoryStore::new(),
            crate::LocalRemote::new(db),
            crate::MemoryCursorStore::new(),
            ReplicatorConfig::new("s").with_idempotency_key_fn(fixed_key),
        );

        replicator.push_local(upsert("1", "hello", 1000, "a")).await.unwrap();
        let first = replicator.sync().await.unwrap();
        assert_eq!(first.pushed, 1);

        // Simulate "lost the response, retry": re-enqueue the same change
        // and sync again with the same fixed idempotency key.
        replicator.outbox().push("s", upsert("1", "hello", 1000, "a")).await;
        let retry = replicator.sync().await.unwrap();
        assert_eq!(retry.pushed, 0, "server's accepted is 0 on the retry");
    }
}
