use rippledb_db::Db;
use rippledb_types::{AppendRequest, AppendResponse, PullRequest, PullResponse};

use crate::error::TransportError;

/// The client-side view of the server log broker (spec §4.6): same wire
/// contract as [`rippledb_db::Db`], but every failure — network, decode,
/// remote-side rejection — is reported uniformly as a [`TransportError`].
pub trait Remote {
    fn pull(
        &self,
        request: PullRequest,
    ) -> impl Future<Output = Result<PullResponse, TransportError>> + Send;

    fn append(
        &self,
        request: AppendRequest,
    ) -> impl Future<Output = Result<AppendResponse, TransportError>> + Send;
}

/// Adapts any in-process [`Db`] into a [`Remote`] with no network in
/// between — used for same-process replication tests and single-binary
/// deployments that skip HTTP entirely.
pub struct LocalRemote<D> {
    db: D,
}

impl<D> LocalRemote<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }
}

impl<D: Db + Sync> Remote for LocalRemote<D> {
    async fn pull(&self, request: PullRequest) -> Result<PullResponse, TransportError> {
        self.db.pull(request).await.map_err(TransportError::new)
    }

    async fn append(&self, request: AppendRequest) -> Result<AppendResponse, TransportError> {
        self.db.append(request).await.map_err(TransportError::new)
    }
}
