use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tracing::trace;

use rippledb_store::{Row, Store, StoreError};

use crate::scheduler::{Scheduler, TokioScheduler};

/// How a loader schedules its per-tick flush (spec §6 config table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushStrategy {
    /// Flush on the next microtask-equivalent tick.
    #[default]
    Auto,
    Microtask,
    Frame,
}

struct Pending {
    ids: Vec<String>,
    waiters: Vec<(String, oneshot::Sender<Result<Option<Row>, StoreError>>)>,
    flush_scheduled: bool,
}

impl Default for Pending {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            waiters: Vec::new(),
            flush_scheduled: false,
        }
    }
}

struct Inner<S, Sch> {
    store: S,
    entity: String,
    strategy: FlushStrategy,
    scheduler: Sch,
    pending: Mutex<Pending>,
}

/// A per-entity batch loader over `Store::get_rows` (spec §4.8).
pub struct Loader<S, Sch = TokioScheduler> {
    inner: Arc<Inner<S, Sch>>,
}

impl<S, Sch> Clone for Loader<S, Sch> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, Sch> Loader<S, Sch>
where
    S: Store + Send + Sync + 'static,
    Sch: Scheduler + 'static,
{
    pub fn with_scheduler(
        store: S,
        entity: impl Into<String>,
        strategy: FlushStrategy,
        scheduler: Sch,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                entity: entity.into(),
                strategy,
                scheduler,
                pending: Mutex::new(Pending::default()),
            }),
        }
    }

    /// Enqueues `id`, schedules a flush if one is not already pending for
    /// this tick, and resolves once that flush completes (spec §4.8).
    pub async fn load(&self, id: impl Into<String>) -> Result<Option<Row>, StoreError> {
        let id = id.into();
        let (tx, rx) = oneshot::channel();

        let should_schedule = {
            let mut pending = self.inner.pending.lock().await;
            pending.ids.push(id.clone());
            pending.waiters.push((id, tx));
            if pending.flush_scheduled {
                false
            } else {
                pending.flush_scheduled = true;
                true
            }
        };

        if should_schedule {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                match inner.strategy {
                    FlushStrategy::Microtask | FlushStrategy::Auto => {
                        inner.scheduler.defer_microtask().await;
                    }
                    FlushStrategy::Frame => inner.scheduler.defer_frame().await,
                }
                flush(&inner).await;
            });
        }

        rx.await.map_err(|_| StoreError::Closed)?
    }

    /// Reads `ids` immediately via `Store::get_rows`, bypassing the pending
    /// queue entirely — for callers that already have the full id set and
    /// would gain nothing from coalescing (spec §4.8).
    pub async fn load_many(&self, ids: &[String]) -> Result<HashMap<String, Row>, StoreError> {
        self.inner.store.get_rows(&self.inner.entity, ids).await
    }
}

async fn flush<S: Store, Sch: Scheduler>(inner: &Inner<S, Sch>) {
    let (ids, waiters) = {
        let mut pending = inner.pending.lock().await;
        pending.flush_scheduled = false;
        (
            std::mem::take(&mut pending.ids),
            std::mem::take(&mut pending.waiters),
        )
    };
    if ids.is_empty() {
        return;
    }

    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

    trace!(entity = %inner.entity, requested = waiters.len(), unique = unique.len(), "loader flush");

    match inner.store.get_rows(&inner.entity, &unique).await {
        Ok(rows) => {
            for (id, sender) in waiters {
                let _ = sender.send(Ok(rows.get(&id).cloned()));
            }
        }
        Err(err) => {
            for (_, sender) in waiters {
                let _ = sender.send(Err(err.clone()));
            }
        }
    }
}

/// Convenience constructor using the default [`TokioScheduler`].
pub fn make_loader<S>(
    store: S,
    entity: impl Into<String>,
    flush_strategy: FlushStrategy,
) -> Loader<S, TokioScheduler>
where
    S: Store + Send + Sync + 'static,
{
    Loader::with_scheduler(store, entity, flush_strategy, TokioScheduler::new())
}
