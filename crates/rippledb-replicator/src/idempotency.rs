use rippledb_types::Change;

/// The reference idempotency key: a blake3 hash of the batch's HLCs in
/// order (spec §4.6: "the replicator SHOULD generate a stable idempotency
/// key per drained batch, e.g., hash of the ordered HLCs"). Order-sensitive
/// by design — a retried batch must hash identically to its original, but
/// two different orderings of the same changes are different intents.
pub fn default_idempotency_key(changes: &[Change]) -> String {
    let mut hasher = blake3::Hasher::new();
    for change in changes {
        hasher.update(change.hlc().to_string().as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}
