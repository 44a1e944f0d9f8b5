//! Sample schema descriptors and a convenience wiring-up of a store, a log
//! broker, and a replicator, used by the integration tests and useful as a
//! starting point for a real application.

use rippledb_db::InMemoryDb;
use rippledb_replicator::{LocalRemote, MemoryCursorStore, Replicator, ReplicatorConfig};
use rippledb_store::MemoryStore;
use rippledb_types::{EntityDescriptor, FieldDescriptor, SchemaRegistry};

/// A household todo list item.
pub fn todo_entity() -> EntityDescriptor {
    EntityDescriptor::new("todo")
        .field(FieldDescriptor::new("title", true))
        .field(FieldDescriptor::new("done", false))
}

/// A household member.
pub fn user_entity() -> EntityDescriptor {
    EntityDescriptor::new("user")
        .field(FieldDescriptor::new("name", true))
        .field(FieldDescriptor::new("color", false))
}

/// The registry for the `todo`/`user` sample schema.
pub fn schema() -> SchemaRegistry {
    SchemaRegistry::new()
        .register(todo_entity())
        .register(user_entity())
}

/// A fully wired client: a [`MemoryStore`] replicating against an in-process
/// [`InMemoryDb`] over the given `stream`, with an in-memory cursor store.
pub fn client(stream: impl Into<String>) -> Replicator<MemoryStore, LocalRemote<InMemoryDb>, MemoryCursorStore> {
    let store = MemoryStore::new();
    let db = InMemoryDb::new();
    let remote = LocalRemote::new(db);
    let cursor_store = MemoryCursorStore::new();
    let config = ReplicatorConfig::new(stream);
    Replicator::new(store, remote, cursor_store, config)
}

/// Two clients replicating against the same in-process server, as used by
/// the multi-client end-to-end scenarios.
pub fn client_pair(
    stream: impl Into<String>,
) -> (
    Replicator<MemoryStore, LocalRemote<InMemoryDb>, MemoryCursorStore>,
    Replicator<MemoryStore, LocalRemote<InMemoryDb>, MemoryCursorStore>,
) {
    let stream = stream.into();
    let db = InMemoryDb::new();
    let a = Replicator::new(
        MemoryStore::new(),
        LocalRemote::new(db.clone()),
        MemoryCursorStore::new(),
        ReplicatorConfig::new(stream.clone()),
    );
    let b = Replicator::new(
        MemoryStore::new(),
        LocalRemote::new(db),
        MemoryCursorStore::new(),
        ReplicatorConfig::new(stream),
    );
    (a, b)
}
