use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use rippledb_hlc::Hlc;
use rippledb_types::{AppendRequest, AppendResponse, Change, PullRequest, PullResponse};

use crate::db::{Db, DEFAULT_PULL_LIMIT};
use crate::error::DbError;

#[derive(Default)]
struct Inner {
    // Per-stream log, ordered by strictly increasing sequence number
    // starting at 1. The Vec index is not the sequence — entries never
    // move or get removed, so sequence == position + 1 always holds, but
    // we store it explicitly for readability at the call sites below.
    streams: HashMap<String, Vec<(u64, Change)>>,
    // Keyed by (stream, idempotency_key); records the fingerprint of the
    // batch originally accepted under that key, so a later append under
    // the same key can tell a genuine retry from a conflicting reuse.
    idempotency: HashMap<(String, String), String>,
}

/// A fingerprint of a batch's contents, used to tell a genuine retry (same
/// key, same changes) apart from a conflicting reuse of the same key for a
/// different batch. Distinct from `rippledb_replicator::default_idempotency_key`
/// (which derives the *key* a client sends) — this hashes the full change
/// set the server actually received, not just HLCs, so two different
/// batches that happen to share a last-write HLC still fingerprint apart.
fn fingerprint(changes: &[Change]) -> String {
    let mut hasher = blake3::Hasher::new();
    for change in changes {
        hasher.update(change.entity().as_bytes());
        hasher.update(b"\0");
        hasher.update(change.entity_id().as_bytes());
        hasher.update(b"\0");
        hasher.update(change.hlc().to_string().as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// The reference in-memory `Db` adapter (spec §4.5). A production adapter
/// persists the log and the idempotency table durably; this one keeps both
/// behind a single lock for the lifetime of the process.
#[derive(Clone, Default)]
pub struct InMemoryDb {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Db for InMemoryDb {
    async fn append(&self, request: AppendRequest) -> Result<AppendResponse, DbError> {
        for change in &request.changes {
            change.validate()?;
        }

        let mut inner = self.inner.lock().await;

        let batch_fingerprint = request.idempotency_key.as_ref().map(|_| fingerprint(&request.changes));

        if let Some(key) = &request.idempotency_key {
            if let Some(seen_fingerprint) = inner.idempotency.get(&(request.stream.clone(), key.clone())) {
                if Some(seen_fingerprint.as_str()) == batch_fingerprint.as_deref() {
                    debug!(stream = %request.stream, %key, "append replay: idempotency key already seen");
                    return Ok(AppendResponse {
                        accepted: 0,
                        hlc: None,
                    });
                }
                return Err(DbError::Conflict {
                    stream: request.stream.clone(),
                    key: key.clone(),
                });
            }
        }

        let log = inner.streams.entry(request.stream.clone()).or_default();
        let mut next_seq = log.last().map_or(1, |(seq, _)| seq + 1);
        let mut last_hlc: Option<Hlc> = None;
        for change in &request.changes {
            last_hlc = Some(change.hlc().clone());
            log.push((next_seq, change.clone()));
            next_seq += 1;
        }

        let accepted = request.changes.len() as u32;
        if let Some(key) = request.idempotency_key {
            let fingerprint = batch_fingerprint.expect("idempotency_key implies batch_fingerprint");
            inner.idempotency.insert((request.stream.clone(), key), fingerprint);
        }

        info!(stream = %request.stream, accepted, "append committed");
        Ok(AppendResponse {
            accepted,
            hlc: last_hlc,
        })
    }

    async fn pull(&self, request: PullRequest) -> Result<PullResponse, DbError> {
        let inner = self.inner.lock().await;

        let after: u64 = match &request.cursor {
            None => 0,
            Some(cursor) => cursor
                .parse()
                .map_err(|_| DbError::InvalidCursor {
                    cursor: cursor.clone(),
                })?,
        };
        let limit = request.limit.unwrap_or(DEFAULT_PULL_LIMIT) as usize;

        let mut changes = Vec::new();
        let mut last_seq = None;
        if let Some(log) = inner.streams.get(&request.stream) {
            for (seq, change) in log.iter().filter(|(seq, _)| *seq > after) {
                changes.push(change.clone());
                last_seq = Some(*seq);
                if changes.len() >= limit {
                    break;
                }
            }
        }

        debug!(
            stream = %request.stream,
            after,
            returned = changes.len(),
            "pull served"
        );
        Ok(PullResponse {
            next_cursor: last_seq.map(|seq| seq.to_string()),
            changes,
        })
    }
}
