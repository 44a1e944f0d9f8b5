use std::collections::HashMap;

use rippledb_hlc::Hlc;
use serde_json::Value;

/// Per-`(entity, entity_id)` state held only inside a `Store` (spec §3).
///
/// Invariant: every key present in `tags` is present in `values` and vice
/// versa; `deleted() == true` implies `deleted_tag().is_some()`.
///
/// `deleted` is *not* a stored field here — it is derived from `tags` and
/// `deleted_tag` by [`Record::deleted`]. Storing it as an independently
/// mutated boolean (set on a winning delete, cleared on a winning upsert)
/// makes the outcome depend on application order: a delete applied after a
/// later-tagged upsert would always "win" the boolean flip since it only
/// ever compared itself to the previous `deleted_tag`, never to the
/// field's own tag. Deriving `deleted` from the same per-field `max` that
/// already makes `tags` and `deleted_tag` commutative keeps the whole
/// record commutative (spec §4.3, §8 item 1): both `tags[f]` and
/// `deleted_tag` are running per-key maxima over a total order, and
/// "exists a field tag that dominates `deleted_tag`" is a pure function of
/// those two maxima, so it cannot depend on the order changes arrived in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
    tags: HashMap<String, Hlc>,
    deleted_tag: Option<Hlc>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a read should treat this record as present (spec §4.4:
    /// "reads treat `deleted=true` as absent"). True whenever there is no
    /// tombstone yet, or at least one field's tag dominates it.
    pub fn is_visible(&self) -> bool {
        match &self.deleted_tag {
            None => true,
            Some(tag) => self.tags.values().any(|t| t > tag),
        }
    }

    pub fn deleted(&self) -> bool {
        !self.is_visible()
    }

    pub fn deleted_tag(&self) -> Option<&Hlc> {
        self.deleted_tag.as_ref()
    }

    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    pub fn tags(&self) -> &HashMap<String, Hlc> {
        &self.tags
    }

    pub(crate) fn values_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.values
    }

    pub(crate) fn tags_mut(&mut self) -> &mut HashMap<String, Hlc> {
        &mut self.tags
    }

    /// Folds a delete's HLC into the tombstone's running maximum (spec
    /// §4.3: "if `R.deleted_tag` is absent or `compare(C.hlc,
    /// R.deleted_tag) > 0`, set ... `R.deleted_tag = C.hlc`").
    pub(crate) fn bump_deleted_tag(&mut self, tag: &Hlc) {
        let wins = match &self.deleted_tag {
            None => true,
            Some(existing) => tag > existing,
        };
        if wins {
            self.deleted_tag = Some(tag.clone());
        }
    }

    /// Invariant check used by tests after every apply.
    #[cfg(test)]
    pub fn check_invariants(&self) -> bool {
        let same_keys = {
            let mut v: Vec<_> = self.values.keys().collect();
            let mut t: Vec<_> = self.tags.keys().collect();
            v.sort();
            t.sort();
            v == t
        };
        let deleted_implies_tag = !self.deleted() || self.deleted_tag.is_some();
        same_keys && deleted_implies_tag
    }
}
