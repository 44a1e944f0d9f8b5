use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use rippledb_merge::{apply, Record};
use rippledb_types::{Change, DbEvent, DbEventKind};

use crate::error::StoreError;
use crate::event_bus::{EventBus, EventCallback, Unsubscribe};
use crate::store::{ListQuery, Row, Store};

type Key = (String, String);

/// The reference in-memory `Store` adapter (spec §4.4). Single-writer
/// concurrency (spec §5) is enforced with one `tokio::sync::Mutex`
/// guarding all records: `apply_changes` holds it for the whole batch,
/// reads hold it only long enough to clone a snapshot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<BTreeMap<Key, Record>>>,
    events: EventBus,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn classify(before_visible: bool, after_visible: bool) -> DbEventKind {
        match (before_visible, after_visible) {
            (false, true) => DbEventKind::Insert,
            (true, true) => DbEventKind::Update,
            (true, false) => DbEventKind::Delete,
            // Touched but stayed absent (a delete re-applied to an
            // already-deleted record, or a losing upsert on one) —
            // spec §4.4: "events carry intent to invalidate, not
            // semantic novelty".
            (false, false) => DbEventKind::Update,
        }
    }
}

impl Store for MemoryStore {
    async fn apply_changes(&self, changes: Vec<Change>) -> Result<(), StoreError> {
        for change in &changes {
            change.validate()?;
        }
        if changes.is_empty() {
            return Ok(());
        }

        let mut records = self.records.lock().await;

        // Capture each touched key's pre-batch visibility exactly once, in
        // first-touch order, so a key hit by several changes in this
        // batch still yields exactly one event (spec §4.4, §8 item 7).
        let mut before_visible: HashMap<Key, bool> = HashMap::new();
        let mut touch_order: Vec<Key> = Vec::new();

        for change in &changes {
            let key = (change.entity().to_string(), change.entity_id().to_string());
            before_visible.entry(key.clone()).or_insert_with(|| {
                touch_order.push(key.clone());
                records.get(&key).is_some_and(Record::is_visible)
            });
            let record = records.entry(key).or_default();
            apply(record, change);
        }

        let events: Vec<DbEvent> = touch_order
            .into_iter()
            .map(|key| {
                let after = records.get(&key).is_some_and(Record::is_visible);
                let kind = Self::classify(before_visible[&key], after);
                DbEvent::new(key.0, kind, key.1)
            })
            .collect();

        drop(records);

        debug!(batch_size = changes.len(), events = events.len(), "apply_changes committed");
        for event in &events {
            self.events.publish(event);
        }
        Ok(())
    }

    async fn get_row(&self, entity: &str, id: &str) -> Result<Option<Row>, StoreError> {
        let records = self.records.lock().await;
        Ok(records
            .get(&(entity.to_string(), id.to_string()))
            .filter(|r| r.is_visible())
            .map(|r| r.values().clone()))
    }

    async fn get_rows(
        &self,
        entity: &str,
        ids: &[String],
    ) -> Result<HashMap<String, Row>, StoreError> {
        let records = self.records.lock().await;
        let mut out = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = records
                .get(&(entity.to_string(), id.clone()))
                .filter(|r| r.is_visible())
            {
                out.insert(id.clone(), record.values().clone());
            }
        }
        Ok(out)
    }

    async fn list_rows(&self, query: &ListQuery) -> Result<Vec<Row>, StoreError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|((entity, _), record)| entity == &query.entity && record.is_visible())
            .map(|(_, record)| record.values().clone())
            .collect())
    }

    fn on_event(&self, callback: EventCallback) -> Unsubscribe {
        self.events.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rippledb_hlc::Hlc;
    use rippledb_types::{DbEventKind, MakeDelete, MakeUpsert};
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn upsert(entity: &str, id: &str, field: &str, value: &str, wall: u64, node: &str) -> Change {
        Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: entity.into(),
            entity_id: id.into(),
            patch: Map::from([(field.to_string(), serde_json::json!(value))]),
            hlc: Hlc::new(wall, 0, node),
        })
    }

    fn delete(entity: &str, id: &str, wall: u64, node: &str) -> Change {
        Change::make_delete(MakeDelete {
            stream: "s".into(),
            entity: entity.into(),
            entity_id: id.into(),
            hlc: Hlc::new(wall, 0, node),
        })
    }

    #[tokio::test]
    async fn apply_then_get_row_round_trips() {
        let store = MemoryStore::new();
        store
            .apply_changes(vec![upsert("todo", "1", "title", "hello", 1000, "a")])
            .await
            .unwrap();
        let row = store.get_row("todo", "1").await.unwrap().unwrap();
        assert_eq!(row["title"], serde_json::json!("hello"));
    }

    #[tokio::test]
    async fn deleted_rows_are_absent_from_reads() {
        let store = MemoryStore::new();
        store
            .apply_changes(vec![upsert("todo", "1", "title", "hello", 1000, "a")])
            .await
            .unwrap();
        store
            .apply_changes(vec![delete("todo", "1", 2000, "a")])
            .await
            .unwrap();
        assert!(store.get_row("todo", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_batch_is_rejected_wholesale() {
        let store = MemoryStore::new();
        let good = upsert("todo", "1", "title", "hello", 1000, "a");
        // A delete carrying a non-empty patch fails `Change::validate`;
        // build it via `from_parts`, bypassing its own rejection, by
        // assembling the struct fields directly is not possible (private),
        // so we round-trip through serde instead to get a genuinely
        // malformed value past construction-time validation.
        let mut bad_json = serde_json::to_value(delete("todo", "2", 1000, "a")).unwrap();
        bad_json["patch"] = serde_json::json!({"title": "oops"});
        let bad: Change = serde_json::from_value(bad_json).unwrap();
        assert!(bad.validate().is_err());

        let result = store.apply_changes(vec![good, bad]).await;
        assert!(result.is_err());
        assert!(store.get_row("todo", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn apply_changes_emits_insert_then_update_then_delete() {
        let store = MemoryStore::new();
        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);
        let _sub = store.on_event(Box::new(move |event| {
            events_clone.lock().unwrap().push(event.clone());
        }));

        store
            .apply_changes(vec![upsert("todo", "1", "title", "a", 1000, "a")])
            .await
            .unwrap();
        store
            .apply_changes(vec![upsert("todo", "1", "title", "b", 2000, "a")])
            .await
            .unwrap();
        store
            .apply_changes(vec![delete("todo", "1", 3000, "a")])
            .await
            .unwrap();

        let kinds: Vec<_> = events.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![DbEventKind::Insert, DbEventKind::Update, DbEventKind::Delete]
        );
    }

    #[tokio::test]
    async fn one_batch_touching_an_id_twice_emits_one_event() {
        let store = MemoryStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let _sub = store.on_event(Box::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        store
            .apply_changes(vec![
                upsert("todo", "1", "title", "a", 1000, "a"),
                upsert("todo", "1", "done", "true", 1001, "a"),
            ])
            .await
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn list_rows_filters_by_entity_and_visibility() {
        let store = MemoryStore::new();
        store
            .apply_changes(vec![
                upsert("todo", "1", "title", "a", 1000, "a"),
                upsert("todo", "2", "title", "b", 1000, "a"),
                upsert("user", "1", "name", "carol", 1000, "a"),
            ])
            .await
            .unwrap();
        store
            .apply_changes(vec![delete("todo", "2", 2000, "a")])
            .await
            .unwrap();

        let todos = store
            .list_rows(&ListQuery::entity("todo"))
            .await
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["title"], serde_json::json!("a"));
    }

    #[tokio::test]
    async fn get_rows_omits_missing_and_deleted_ids() {
        let store = MemoryStore::new();
        store
            .apply_changes(vec![upsert("todo", "1", "title", "a", 1000, "a")])
            .await
            .unwrap();
        let result = store
            .get_rows("todo", &["1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.contains_key("1"));
    }
}
