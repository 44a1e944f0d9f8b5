use rippledb_types::DbEventKind;

/// A single cache invalidation produced by an [`InvalidationWiring`](crate::InvalidationWiring)
/// flush (spec §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// A list query's key prefix — either an entity name touched directly
    /// (the implicit `[entity]` prefix) or a registry entry's own
    /// `query_key`.
    List(Vec<String>),
    /// One row, keyed `[entity, id]`. `kind` is the last event kind
    /// observed for this row within the flush window; a consumer should
    /// evict the cached row outright on `DbEventKind::Delete`.
    Row {
        entity: String,
        id: String,
        kind: DbEventKind,
    },
}

/// Callback invoked once per [`Invalidation`] at flush time.
pub type InvalidationCallback = Box<dyn Fn(&Invalidation) + Send + Sync>;
