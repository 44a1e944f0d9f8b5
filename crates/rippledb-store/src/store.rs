use std::collections::HashMap;

use serde_json::Value;

use rippledb_types::Change;

use crate::error::StoreError;
use crate::event_bus::{EventCallback, Unsubscribe};

/// A snapshotted row: field name to value, by value (spec §4.4 — "Snapshots
/// are by value; later applies never mutate returned snapshots").
pub type Row = HashMap<String, Value>;

/// The reference in-memory query shape (spec §4.4): "all non-deleted rows
/// of one entity". A concrete adapter backed by SQL/KV storage would widen
/// this with its own filter/sort predicate; the core only fixes this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub entity: String,
}

impl ListQuery {
    pub fn entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }
}

/// The client-side local truth store (spec §4.4).
///
/// All methods are `async` because every one of them is a suspension point
/// (spec §5): a production adapter backs this with disk or an embedded
/// database and must be free to await I/O. The reference [`MemoryStore`]
/// never actually suspends, but the trait shape is what a real adapter
/// needs.
///
/// [`MemoryStore`]: crate::MemoryStore
pub trait Store {
    /// Applies `changes` atomically: every record update in the batch
    /// commits as a single step, then one `DbEvent` per affected
    /// `(entity, id)` fires, in record-update order. If any change fails
    /// `Change::validate`, the whole batch is rejected and no state
    /// changes and no events fire (spec §4.4, §5, §7).
    fn apply_changes(
        &self,
        changes: Vec<Change>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// A snapshot of one row, or `None` if absent or deleted.
    fn get_row(
        &self,
        entity: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Row>, StoreError>> + Send;

    /// Bulk form of `get_row`. Missing or deleted ids are absent from the
    /// result map.
    fn get_rows(
        &self,
        entity: &str,
        ids: &[String],
    ) -> impl Future<Output = Result<HashMap<String, Row>, StoreError>> + Send;

    /// All non-deleted rows matching `query`.
    fn list_rows(&self, query: &ListQuery) -> impl Future<Output = Result<Vec<Row>, StoreError>> + Send;

    /// Registers a callback for every post-commit `DbEvent`. The callback
    /// must not call `apply_changes` synchronously (spec §4.4, §5) — it
    /// may only schedule further work.
    fn on_event(&self, callback: EventCallback) -> Unsubscribe;
}
