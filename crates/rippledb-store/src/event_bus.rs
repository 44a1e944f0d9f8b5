use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, Weak};

use tracing::warn;

use rippledb_types::DbEvent;

/// A subscriber callback (spec §4.4: `on_event`).
pub type EventCallback = Box<dyn Fn(&DbEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: EventCallback,
}

#[derive(Default)]
struct Inner {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: std::sync::atomic::AtomicU64,
}

/// A small pub/sub hub for post-commit `DbEvent`s.
///
/// Modeled per spec §9's design note: subscribers get an explicit
/// [`Unsubscribe`] handle rather than relying on a closure capturing a
/// strong reference back into the bus. `Unsubscribe` holds only a `Weak`
/// pointer, so dropping the owning `Store` (and with it the bus) makes
/// every outstanding `Unsubscribe` a harmless no-op instead of keeping the
/// bus alive.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback. Returns a handle that removes it when
    /// [`Unsubscribe::unsubscribe`] is called (or simply dropped — this
    /// bus does not auto-remove on drop, matching the "may schedule
    /// further work" semantics of callbacks that outlive one event).
    pub fn subscribe(&self, callback: EventCallback) -> Unsubscribe {
        let id = self
            .inner
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Subscriber { id, callback });
        Unsubscribe {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Publishes `event` to every live subscriber.
    ///
    /// Per spec §7, a callback that panics is caught and logged, never
    /// allowed to propagate into the store's commit path or poison other
    /// subscribers.
    pub fn publish(&self, event: &DbEvent) {
        let subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        for subscriber in subscribers.iter() {
            let callback = AssertUnwindSafe(&subscriber.callback);
            if let Err(panic) = std::panic::catch_unwind(|| (callback.0)(event)) {
                let message = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic payload>");
                warn!(subscriber_id = subscriber.id, %message, "on_event callback panicked");
            }
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
pub struct Unsubscribe {
    id: u64,
    bus: Weak<Inner>,
}

impl Unsubscribe {
    /// Removes the associated callback. A no-op if the bus (and its
    /// owning `Store`) has already been dropped.
    pub fn unsubscribe(self) {
        let Some(inner) = self.bus.upgrade() else {
            return;
        };
        let mut subscribers = inner.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|s| s.id != self.id);
    }
}
