use serde::{Deserialize, Serialize};

/// The kind of state transition a [`DbEvent`] reports (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEventKind {
    Insert,
    Update,
    Delete,
}

/// A post-commit notification emitted by a `Store` after a successful
/// `apply_changes` batch (spec §3, §4.4). Never emitted mid-batch, and at
/// most one per `(entity, id)` touched by the batch (spec §8 item 7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbEvent {
    pub entity: String,
    pub kind: DbEventKind,
    pub id: Option<String>,
}

impl DbEvent {
    pub fn new(entity: impl Into<String>, kind: DbEventKind, id: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            kind,
            id: Some(id.into()),
        }
    }
}
