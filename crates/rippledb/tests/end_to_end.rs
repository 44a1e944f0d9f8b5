//! Integration tests wiring the store, log broker, and replicator together
//! exactly as described by the end-to-end scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rippledb::{
    demo, Change, Db, DbEventKind, Hlc, InMemoryDb, Invalidation, InvalidationWiring, LocalRemote,
    MakeDelete, MakeUpsert, MemoryCursorStore, MemoryStore, Registry, Replicator,
    ReplicatorConfig, Store, WiringConfig,
};

fn upsert(entity_id: &str, field: &str, value: &str, wall: u64, node: &str) -> Change {
    Change::make_upsert(MakeUpsert {
        stream: "s".into(),
        entity: "todo".into(),
        entity_id: entity_id.into(),
        patch: HashMap::from([(field.to_string(), serde_json::json!(value))]),
        hlc: Hlc::new(wall, 0, node),
    })
}

fn delete(entity_id: &str, wall: u64, node: &str) -> Change {
    Change::make_delete(MakeDelete {
        stream: "s".into(),
        entity: "todo".into(),
        entity_id: entity_id.into(),
        hlc: Hlc::new(wall, 0, node),
    })
}

type Client = Replicator<MemoryStore, LocalRemote<InMemoryDb>, MemoryCursorStore>;

fn clients() -> (Client, Client) {
    demo::client_pair("s")
}

#[tokio::test]
async fn scenario_1_create_then_replicate() {
    let (a, b) = clients();

    a.push_local(upsert("1", "title", "hello", 1000, "a")).await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    let row = b.store().get_row("todo", "1").await.unwrap().unwrap();
    assert_eq!(row["title"], serde_json::json!("hello"));
}

#[tokio::test]
async fn scenario_2_concurrent_write_lww_by_hlc_node_id() {
    let (a, b) = clients();

    a.push_local(upsert("1", "title", "hello", 1000, "a")).await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    a.push_local(upsert("1", "title", "A-version", 2000, "a")).await.unwrap();
    b.push_local(upsert("1", "title", "B-version", 2000, "b")).await.unwrap();

    a.sync().await.unwrap();
    b.sync().await.unwrap();
    a.sync().await.unwrap();

    let row_a = a.store().get_row("todo", "1").await.unwrap().unwrap();
    let row_b = b.store().get_row("todo", "1").await.unwrap().unwrap();
    assert_eq!(row_a["title"], serde_json::json!("B-version"));
    assert_eq!(row_b["title"], serde_json::json!("B-version"));
}

#[tokio::test]
async fn scenario_3_delete_dominates_newer() {
    let (a, b) = clients();

    a.push_local(upsert("1", "title", "hello", 1000, "a")).await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    a.push_local(delete("1", 3000, "a")).await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    assert!(b.store().get_row("todo", "1").await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_4_late_upsert_loses_to_tombstone() {
    let (a, b) = clients();

    a.push_local(upsert("1", "title", "hello", 1000, "a")).await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    a.push_local(delete("1", 3000, "a")).await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    // B, unaware of the delete's HLC relationship, submits an upsert whose
    // tag (2500) is older than the tombstone's (3000).
    b.push_local(upsert("1", "title", "too-late", 2500, "b")).await.unwrap();
    b.sync().await.unwrap();
    a.sync().await.unwrap();
    b.sync().await.unwrap();

    assert!(a.store().get_row("todo", "1").await.unwrap().is_none());
    assert!(b.store().get_row("todo", "1").await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_5_idempotent_append_on_retry() {
    let db = InMemoryDb::new();
    let fixed_key: rippledb::IdempotencyKeyFn = Arc::new(|_: &[Change]| "retry-key".to_string());
    let replicator = Replicator::new(
        MemoryStore::new(),
        LocalRemote::new(db.clone()),
        MemoryCursorStore::new(),
        ReplicatorConfig::new("s").with_idempotency_key_fn(fixed_key),
    );

    replicator.push_local(upsert("1", "title", "hello", 1000, "a")).await.unwrap();
    let first = replicator.sync().await.unwrap();
    assert_eq!(first.pushed, 1);

    // Simulate "client lost the response, retries with the same batch and
    // idempotency key": re-enqueue and sync again.
    replicator.outbox().push("s", upsert("1", "title", "hello", 1000, "a")).await;
    let retry = replicator.sync().await.unwrap();
    assert_eq!(retry.pushed, 0);

    let log = db
        .pull(rippledb::PullRequest {
            stream: "s".into(),
            cursor: None,
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(log.changes.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn scenario_6_debounced_invalidation() {
    let store = MemoryStore::new();
    let invalidations = Arc::new(Mutex::new(Vec::new()));
    let invalidations_clone = Arc::clone(&invalidations);
    let _wiring = InvalidationWiring::new(
        &store,
        Arc::new(Registry::new()),
        WiringConfig {
            debounce_ms: 50,
            invalidate_rows: true,
        },
        Box::new(move |invalidation| {
            invalidations_clone.lock().unwrap().push(invalidation.clone());
        }),
    );

    store
        .apply_changes(vec![Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "todo".into(),
            entity_id: "1".into(),
            patch: HashMap::from([("title".to_string(), serde_json::json!("a"))]),
            hlc: Hlc::new(1000, 0, "a"),
        })])
        .await
        .unwrap();
    store
        .apply_changes(vec![Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "todo".into(),
            entity_id: "2".into(),
            patch: HashMap::from([("title".to_string(), serde_json::json!("b"))]),
            hlc: Hlc::new(1005, 0, "a"),
        })])
        .await
        .unwrap();
    store
        .apply_changes(vec![Change::make_upsert(MakeUpsert {
            stream: "s".into(),
            entity: "user".into(),
            entity_id: "1".into(),
            patch: HashMap::from([("name".to_string(), serde_json::json!("Alice"))]),
            hlc: Hlc::new(1010, 0, "a"),
        })])
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    let got = invalidations.lock().unwrap().clone();
    assert_eq!(got.len(), 5, "{got:?}");
    assert!(got.contains(&Invalidation::List(vec!["todo".to_string()])));
    assert!(got.contains(&Invalidation::List(vec!["user".to_string()])));
    assert!(got.contains(&Invalidation::Row {
        entity: "todo".into(),
        id: "1".into(),
        kind: DbEventKind::Insert,
    }));
    assert!(got.contains(&Invalidation::Row {
        entity: "todo".into(),
        id: "2".into(),
        kind: DbEventKind::Insert,
    }));
    assert!(got.contains(&Invalidation::Row {
        entity: "user".into(),
        id: "1".into(),
        kind: DbEventKind::Insert,
    }));
}
