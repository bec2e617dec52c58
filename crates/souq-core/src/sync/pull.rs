//! Pull reconciler: Remote -> Local
//!
//! Fetches the remote collection as a one-shot snapshot and merges each
//! document into the local store under a last-writer-wins policy keyed on a
//! coarse per-record timestamp. A record with unconfirmed local changes is
//! never overwritten (local-wins-while-dirty); ties and older remote
//! timestamps leave the local copy untouched.

use std::sync::Arc;

use crate::config::FreshnessBasis;
use crate::connectivity::Connectivity;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::RemoteProduct;
use crate::remote::RemoteStore;

/// Counts for one pull cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullStats {
    /// Remote documents the local store had never seen, inserted as `Synced`
    pub added: usize,
    /// Local records overwritten by a strictly newer remote document
    pub updated: usize,
    /// Documents left alone (dirty local copy, tie/older timestamp, or a
    /// logged per-record failure)
    pub skipped: usize,
}

enum MergeOutcome {
    Added,
    Updated,
    Skipped,
}

pub struct PullReconciler {
    repo: Arc<dyn ProductRepository>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    freshness: FreshnessBasis,
}

impl PullReconciler {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        freshness: FreshnessBasis,
    ) -> Self {
        Self {
            repo,
            remote,
            connectivity,
            freshness,
        }
    }

    /// Fetch the full remote snapshot and merge it record by record.
    ///
    /// Offline is not an error: the call returns zero stats and touches
    /// nothing. A per-record merge failure is logged and counted as skipped;
    /// the remaining documents are still processed.
    pub async fn pull_all(&self) -> Result<PullStats> {
        if !self.connectivity.is_online() {
            tracing::debug!("offline, skipping pull");
            return Ok(PullStats::default());
        }

        let docs = self.remote.fetch_all().await?;
        tracing::debug!(count = docs.len(), "merging remote snapshot");

        let mut stats = PullStats::default();
        for doc in &docs {
            match self.merge_one(doc) {
                Ok(MergeOutcome::Added) => stats.added += 1,
                Ok(MergeOutcome::Updated) => stats.updated += 1,
                Ok(MergeOutcome::Skipped) => stats.skipped += 1,
                Err(error) => {
                    tracing::warn!(id = doc.id, %error, "merge failed, skipping document");
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }

    fn merge_one(&self, doc: &RemoteProduct) -> Result<MergeOutcome> {
        let Some(local) = self.repo.get(doc.product_id())? else {
            // Remote is authoritative for records we have never seen
            self.repo.insert_remote(doc)?;
            return Ok(MergeOutcome::Added);
        };

        // Local-wins-while-dirty: unconfirmed local changes are never
        // overwritten by incoming remote data
        if local.sync_state.is_dirty() {
            return Ok(MergeOutcome::Skipped);
        }

        // Strictly-greater remote timestamp wins; equal or older leaves the
        // local copy untouched
        if doc.last_updated > local.freshness_marker(self.freshness) {
            self.repo.apply_remote(doc)?;
            return Ok(MergeOutcome::Updated);
        }

        Ok(MergeOutcome::Skipped)
    }
}
