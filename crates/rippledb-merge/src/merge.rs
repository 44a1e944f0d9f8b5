use tracing::trace;

use rippledb_types::{Change, ChangeKind};

use crate::record::Record;

/// Applies one `Change` to a `Record` in place, per the merge algebra of
/// spec §4.3.
///
/// **Upsert.** For each field `f` in `change.patch()` with tag
/// `change.tags()[f]`: if `record.tags()[f]` is absent or the incoming tag
/// compares greater, the field's value and tag are overwritten; otherwise
/// that field is left untouched.
///
/// **Delete.** Folds `change.hlc()` into the tombstone's running maximum
/// (`record.deleted_tag()`).
///
/// **Resurrection policy** (spec §9 Open Question): tombstone dominance is
/// tag-wise — a record is visible again the moment any one field's own tag
/// dominates `deleted_tag`, independent of the order upserts and deletes
/// were applied in (see the doc comment on [`Record`] for why the simpler
/// "any winning field write unconditionally clears a `deleted` flag" rule
/// the spec names as its default is *not* used here: it makes visibility
/// depend on application order, which breaks the commutativity spec §8
/// item 1 requires every implementation to satisfy).
pub fn apply(record: &mut Record, change: &Change) {
    match change.kind() {
        ChangeKind::Upsert => apply_upsert(record, change),
        ChangeKind::Delete => apply_delete(record, change),
    }
}

fn apply_upsert(record: &mut Record, change: &Change) {
    for (field, incoming_tag) in change.tags() {
        let existing_tag = record.tags().get(field);
        let incoming_wins = match existing_tag {
            None => true,
            Some(existing) => incoming_tag > existing,
        };
        if !incoming_wins {
            trace!(field, "upsert field lost LWW race");
            continue;
        }
        let value = change
            .patch()
            .get(field)
            .expect("Change::validate guarantees patch/tags share keys")
            .clone();
        record.values_mut().insert(field.clone(), value);
        record.tags_mut().insert(field.clone(), incoming_tag.clone());
    }
}

fn apply_delete(record: &mut Record, change: &Change) {
    record.bump_deleted_tag(change.hlc());
}
