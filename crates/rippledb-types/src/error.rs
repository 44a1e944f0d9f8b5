use thiserror::Error;

/// A malformed `Change` (spec §3, §4.4, §7): missing a per-field tag for an
/// upserted field, or a non-empty `patch`/`tags` on a delete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `patch` and `tags` must carry exactly the same field set on an upsert.
    #[error("upsert patch/tags key mismatch for {entity}/{entity_id}: {detail}")]
    PatchTagMismatch {
        entity: String,
        entity_id: String,
        detail: String,
    },

    /// A delete's `patch`/`tags` must both be empty.
    #[error("delete carries a non-empty patch or tags for {entity}/{entity_id}")]
    DeleteCarriesFields { entity: String, entity_id: String },

    /// `patch`/`tags`/`entity`/`entity_id`/`stream` must be non-empty strings.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}
