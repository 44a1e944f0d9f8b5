use std::sync::Mutex;

/// One registry entry: a list query's key prefix and the entity names it
/// depends on (spec §4.7, §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub query_key: Vec<String>,
    pub deps: Vec<String>,
}

/// Maps list-query key prefixes to the entity names those queries depend
/// on (spec §4.7 GLOSSARY "Registry"). Append-only and safe to mutate at
/// runtime — a UI component can register its own query's dependencies the
/// moment it mounts.
#[derive(Default)]
pub struct Registry {
    entries: Mutex<Vec<RegistryEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry. Fluent so a caller can chain several registrations
    /// at construction time; also callable on a shared `&Registry` later.
    pub fn register(&self, query_key: impl Into<Vec<String>>, deps: impl Into<Vec<String>>) -> &Self {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RegistryEntry {
                query_key: query_key.into(),
                deps: deps.into(),
            });
        self
    }

    /// A consistent snapshot of every entry registered so far, in
    /// registration order.
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
