use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use rippledb_hlc::Hlc;

/// Whether a [`Change`] carries new field values or tombstones a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Upsert,
    Delete,
}

/// The atomic replication unit (spec §3): a tagged upsert or a tombstoning
/// delete bound to a `(stream, entity, entity_id)`.
///
/// `Change` is immutable once constructed (spec §3 "Ownership and
/// lifecycle"): every field is private and only observable through the
/// accessors below, so a `Change` handed to a `Store` or an `Outbox` cannot
/// be mutated out from under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub(crate) stream: String,
    pub(crate) entity: String,
    pub(crate) entity_id: String,
    pub(crate) kind: ChangeKind,
    pub(crate) patch: HashMap<String, Value>,
    pub(crate) tags: HashMap<String, Hlc>,
    pub(crate) hlc: Hlc,
}

/// Arguments for [`Change::make_upsert`].
pub struct MakeUpsert {
    pub stream: String,
    pub entity: String,
    pub entity_id: String,
    pub patch: HashMap<String, Value>,
    pub hlc: Hlc,
}

/// Arguments for [`Change::make_delete`].
pub struct MakeDelete {
    pub stream: String,
    pub entity: String,
    pub entity_id: String,
    pub hlc: Hlc,
}

impl Change {
    /// Builds an upsert `Change` (spec §4.2). Every field in `patch` is
    /// tagged with the same `hlc` — one `Change` is one user intent, so all
    /// of its fields should win or lose together under concurrent writes.
    pub fn make_upsert(args: MakeUpsert) -> Self {
        let tags = args
            .patch
            .keys()
            .map(|field| (field.clone(), args.hlc.clone()))
            .collect();
        Self {
            stream: args.stream,
            entity: args.entity,
            entity_id: args.entity_id,
            kind: ChangeKind::Upsert,
            patch: args.patch,
            tags,
            hlc: args.hlc,
        }
    }

    /// Builds a delete `Change` (spec §4.2): empty patch, empty tags, the
    /// `hlc` doubling as the tombstone tag.
    pub fn make_delete(args: MakeDelete) -> Self {
        Self {
            stream: args.stream,
            entity: args.entity,
            entity_id: args.entity_id,
            kind: ChangeKind::Delete,
            patch: HashMap::new(),
            tags: HashMap::new(),
            hlc: args.hlc,
        }
    }

    /// Lower-level constructor for adapters reconstructing a `Change` from
    /// the wire with per-field tags that may differ (e.g. a batched write
    /// coalesced from several source intents). Validates the patch/tags
    /// invariant before returning.
    pub fn from_parts(
        stream: String,
        entity: String,
        entity_id: String,
        kind: ChangeKind,
        patch: HashMap<String, Value>,
        tags: HashMap<String, Hlc>,
        hlc: Hlc,
    ) -> Result<Self, ValidationError> {
        let change = Self {
            stream,
            entity,
            entity_id,
            kind,
            patch,
            tags,
            hlc,
        };
        change.validate()?;
        Ok(change)
    }

    /// Checks the patch/tags invariant from spec §3: an upsert's `patch`
    /// and `tags` must share exactly the same key set; a delete's must both
    /// be empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            ChangeKind::Upsert => {
                let patch_keys: std::collections::BTreeSet<_> = self.patch.keys().collect();
                let tag_keys: std::collections::BTreeSet<_> = self.tags.keys().collect();
                if patch_keys != tag_keys {
                    let missing_tags: Vec<_> = patch_keys
                        .difference(&tag_keys)
                        .map(|s| s.as_str())
                        .collect();
                    let extra_tags: Vec<_> = tag_keys
                        .difference(&patch_keys)
                        .map(|s| s.as_str())
                        .collect();
                    return Err(ValidationError::PatchTagMismatch {
                        entity: self.entity.clone(),
                        entity_id: self.entity_id.clone(),
                        detail: format!(
                            "missing tags for {missing_tags:?}, untagged extra tags {extra_tags:?}"
                        ),
                    });
                }
                Ok(())
            }
            ChangeKind::Delete => {
                if !self.patch.is_empty() || !self.tags.is_empty() {
                    return Err(ValidationError::DeleteCarriesFields {
                        entity: self.entity.clone(),
                        entity_id: self.entity_id.clone(),
                    });
                }
                Ok(())
            }
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn patch(&self) -> &HashMap<String, Value> {
        &self.patch
    }

    pub fn tags(&self) -> &HashMap<String, Hlc> {
        &self.tags
    }

    pub fn hlc(&self) -> &Hlc {
        &self.hlc
    }
}
