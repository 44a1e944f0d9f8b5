//! # RippleDB
//!
//! A headless, local-first sync engine: HLC-ordered field-level
//! last-writer-wins merge, a client-side truth store, a server-side
//! append-only log broker, and the replication, invalidation, and batch
//! loading plumbing around them.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                              RippleDB                               │
//! │  ┌─────────┐   ┌─────────┐   ┌────────┐   ┌───────────┐   ┌──────┐ │
//! │  │   Hlc   │ → │ Change  │ → │ Merge  │ → │   Store   │ → │Events│ │
//! │  │ (clock) │   │ (wire)  │   │ (LWW)  │   │ (truth)   │   │(inv.)│ │
//! │  └─────────┘   └─────────┘   └────────┘   └───────────┘   └──────┘ │
//! │                                    ↕                                │
//! │                          ┌──────────────────┐                       │
//! │                          │ Outbox/Replicator │ ←→ Db (server log)   │
//! │                          └──────────────────┘                       │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use rippledb::{demo, HlcClock, MemoryStore, Store};
//!
//! let mut clock = HlcClock::create("node-a");
//! let store = MemoryStore::new();
//! let hlc = clock.tick(now_ms())?;
//! let change = rippledb::Change::make_upsert(rippledb::MakeUpsert {
//!     stream: "household".into(),
//!     entity: "todo".into(),
//!     entity_id: "1".into(),
//!     patch: [("title".to_string(), serde_json::json!("buy milk"))].into(),
//!     hlc,
//! });
//! store.apply_changes(vec![change]).await?;
//! ```
//!
//! # Modules
//!
//! - **Clock**: [`Hlc`], [`HlcClock`] — hybrid logical clocks
//! - **Wire model**: [`Change`], [`DbEvent`], schema descriptors
//! - **Merge**: [`merge::apply`], [`Record`] — the LWW algebra
//! - **Store**: [`Store`], [`MemoryStore`] — client-side truth
//! - **Db**: [`Db`], [`InMemoryDb`] — server-side log broker
//! - **Replication**: [`Replicator`], [`Outbox`] — pull/apply/push
//! - **Events**: [`InvalidationWiring`], [`Registry`] — cache invalidation
//! - **Loader**: [`Loader`], [`make_loader`] — N+1-free batch reads

pub mod demo;

// Clock
pub use rippledb_hlc::{ClockError, Hlc, HlcClock};

// Wire model and schema
pub use rippledb_types::{
    AppendRequest, AppendResponse, Change, ChangeKind, DbEvent, DbEventKind, EntityDescriptor,
    FieldDescriptor, MakeDelete, MakeUpsert, PullRequest, PullResponse, SchemaError,
    SchemaRegistry, ValidationError,
};

// Merge algebra
pub use rippledb_merge::{self as merge, Record};

// Client-side store
pub use rippledb_store::{EventCallback, ListQuery, MemoryStore, Row, Store, StoreError, Unsubscribe};

// Server-side log broker
pub use rippledb_db::{Db, DbError, InMemoryDb, DEFAULT_PULL_LIMIT};

// Replication
pub use rippledb_replicator::{
    default_idempotency_key, CursorStore, IdempotencyKeyFn, LocalRemote, MemoryCursorStore,
    Outbox, Remote, Replicator, ReplicatorConfig, ReplicatorError, SyncOutcome, TransportError,
};

// Invalidation wiring
pub use rippledb_events::{Invalidation, InvalidationCallback, InvalidationWiring, Registry, RegistryEntry, WiringConfig};

// Batch loader
pub use rippledb_loader::{make_loader, FlushStrategy, Loader, Scheduler, TokioScheduler};
