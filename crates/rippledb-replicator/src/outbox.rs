use std::collections::VecDeque;

use tokio::sync::Mutex;

use rippledb_types::Change;

/// A local FIFO of `Change`s awaiting push to the server (spec §4.6).
///
/// The reference implementation keeps a single per-stream deque; a
/// production outbox persists entries alongside the local store so a crash
/// cannot leave the apply and the queued push out of sync (spec §9).
#[derive(Default)]
pub struct Outbox {
    entries: Mutex<VecDeque<(String, Change)>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `change` at the tail of `stream`'s queue.
    pub async fn push(&self, stream: &str, change: Change) {
        self.entries
            .lock()
            .await
            .push_back((stream.to_string(), change));
    }

    /// Atomically removes and returns every entry queued for `stream`, in
    /// FIFO order.
    pub async fn drain(&self, stream: &str) -> Vec<Change> {
        let mut entries = self.entries.lock().await;
        let (matching, rest): (VecDeque<_>, VecDeque<_>) =
            entries.drain(..).partition(|(s, _)| s == stream);
        *entries = rest;
        matching.into_iter().map(|(_, change)| change).collect()
    }

    /// Re-queues `changes` at the head of `stream`'s queue, preserving
    /// their relative order (spec §4.6: a failed push restores drained
    /// entries to the head, not the tail).
    pub async fn requeue_front(&self, stream: &str, changes: Vec<Change>) {
        let mut entries = self.entries.lock().await;
        for change in changes.into_iter().rev() {
            entries.push_front((stream.to_string(), change));
        }
    }

    /// Number of entries queued, optionally restricted to one stream.
    pub async fn size(&self, stream: Option<&str>) -> usize {
        let entries = self.entries.lock().await;
        match stream {
            Some(stream) => entries.iter().filter(|(s, _)| s == stream).count(),
            None => entries.len(),
        }
    }
}
