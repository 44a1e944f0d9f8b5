use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::trace;

use rippledb_store::{Store, Unsubscribe};
use rippledb_types::{DbEvent, DbEventKind};

use crate::invalidation::{Invalidation, InvalidationCallback};
use crate::registry::Registry;

/// Configuration for an [`InvalidationWiring`] (spec §6 config table).
#[derive(Clone)]
pub struct WiringConfig {
    /// Coalesce window in milliseconds. `0` flushes synchronously after
    /// each event instead of scheduling a timer.
    pub debounce_ms: u64,
    /// Whether to invalidate per-row keys in addition to list prefixes.
    pub invalidate_rows: bool,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            invalidate_rows: true,
        }
    }
}

#[derive(Default)]
struct PendingBatch {
    entity_order: Vec<String>,
    touched_entities: HashSet<String>,
    row_order: Vec<(String, String)>,
    row_kind: HashMap<(String, String), DbEventKind>,
    flush_scheduled: bool,
}

impl PendingBatch {
    fn record(&mut self, event: &DbEvent) {
        if self.touched_entities.insert(event.entity.clone()) {
            self.entity_order.push(event.entity.clone());
        }
        if let Some(id) = &event.id {
            let key = (event.entity.clone(), id.clone());
            if !self.row_kind.contains_key(&key) {
                self.row_order.push(key.clone());
            }
            self.row_kind.insert(key, event.kind);
        }
    }

    fn take(&mut self) -> (Vec<String>, Vec<(String, String)>, HashMap<(String, String), DbEventKind>) {
        self.touched_entities.clear();
        self.flush_scheduled = false;
        (
            std::mem::take(&mut self.entity_order),
            std::mem::take(&mut self.row_order),
            std::mem::take(&mut self.row_kind),
        )
    }
}

struct State {
    pending: Mutex<PendingBatch>,
    registry: Arc<Registry>,
    config: WiringConfig,
    callback: InvalidationCallback,
}

impl State {
    fn flush(&self) {
        let (entity_order, row_order, row_kind) = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.take()
        };
        if entity_order.is_empty() {
            return;
        }

        let touched: HashSet<&str> = entity_order.iter().map(String::as_str).collect();

        for entity in &entity_order {
            (self.callback)(&Invalidation::List(vec![entity.clone()]));
        }
        for entry in self.registry.snapshot() {
            if entry.deps.iter().any(|dep| touched.contains(dep.as_str())) {
                (self.callback)(&Invalidation::List(entry.query_key));
            }
        }
        if self.config.invalidate_rows {
            for (entity, id) in row_order {
                let kind = row_kind[&(entity.clone(), id.clone())];
                (self.callback)(&Invalidation::Row { entity, id, kind });
            }
        }

        trace!(entities = touched.len(), "invalidation flush complete");
    }
}

/// Subscribes to a [`Store`]'s events and turns them into coalesced
/// [`Invalidation`]s (spec §4.7).
///
/// Dropping the `InvalidationWiring` drops its `Unsubscribe` handle, which
/// stops delivery from the store (a no-op if the store was already
/// dropped first).
pub struct InvalidationWiring {
    state: Arc<State>,
    _unsubscribe: Unsubscribe,
}

impl InvalidationWiring {
    /// Wires `store`'s events through `registry` into `callback`, coalescing
    /// per `config.debounce_ms`.
    pub fn new<S: Store>(
        store: &S,
        registry: Arc<Registry>,
        config: WiringConfig,
        callback: InvalidationCallback,
    ) -> Self {
        let state = Arc::new(State {
            pending: Mutex::new(PendingBatch::default()),
            registry,
            config,
            callback,
        });

        enum Action {
            FlushNow,
            ScheduleTimer,
            Noop,
        }

        let state_for_events = Arc::clone(&state);
        let unsubscribe = store.on_event(Box::new(move |event| {
            let action = {
                let mut pending = state_for_events
                    .pending
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                pending.record(event);

                if state_for_events.config.debounce_ms == 0 {
                    Action::FlushNow
                } else if pending.flush_scheduled {
                    Action::Noop
                } else {
                    pending.flush_scheduled = true;
                    Action::ScheduleTimer
                }
            };

            match action {
                Action::FlushNow => state_for_events.flush(),
                Action::ScheduleTimer => {
                    let state_for_timer = Arc::clone(&state_for_events);
                    let delay = Duration::from_millis(state_for_events.config.debounce_ms);
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        state_for_timer.flush();
                    });
                }
                Action::Noop => {}
            }
        }));

        Self {
            state,
            _unsubscribe: unsubscribe,
        }
    }
}
