//! Push reconciler: Local -> Remote
//!
//! Scans the local store for `Dirty` records, serializes each to the remote
//! document shape, and flips the record to `Synced` once the remote write is
//! confirmed. Records are processed sequentially; a failure for one record
//! never aborts the rest — it stays `Dirty` and is retried on the next
//! invocation.

use std::sync::Arc;
use std::time::Duration;

use crate::connectivity::Connectivity;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::{Product, ProductId, RemoteProduct};
use crate::remote::RemoteStore;
use crate::util::now_millis;

/// Counts for one push cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushStats {
    /// Records confirmed written and flipped to `Synced`
    pub pushed: usize,
    /// Records whose upload failed and which remain `Dirty`
    pub failed: usize,
}

pub struct PushReconciler {
    repo: Arc<dyn ProductRepository>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    throttle: Duration,
}

impl PushReconciler {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        throttle: Duration,
    ) -> Self {
        Self {
            repo,
            remote,
            connectivity,
            throttle,
        }
    }

    /// Upload every `Dirty` record, one at a time.
    ///
    /// Offline is not an error: the call returns zero stats and no flags
    /// change. Safe to call repeatedly — records already `Synced` are never
    /// re-considered until a new local mutation resets them.
    pub async fn push_unsynced(&self) -> Result<PushStats> {
        if !self.connectivity.is_online() {
            tracing::debug!("offline, skipping push");
            return Ok(PushStats::default());
        }

        let dirty = self.repo.list_dirty()?;
        if dirty.is_empty() {
            return Ok(PushStats::default());
        }

        tracing::debug!(count = dirty.len(), "pushing unsynced records");
        let mut stats = PushStats::default();
        for (index, product) in dirty.iter().enumerate() {
            // Throttle between successive uploads to avoid bursting the API
            if index > 0 && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            match self.push_record(product).await {
                Ok(()) => stats.pushed += 1,
                Err(error) => {
                    tracing::warn!(id = %product.id, %error, "push failed, record stays dirty");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Upload a single record right after a local write.
    ///
    /// Silently no-ops when the record is missing, already `Synced`, or the
    /// device is offline. An upload failure is logged and swallowed; the
    /// record stays `Dirty` for the next push cycle.
    pub async fn push_one(&self, id: ProductId) -> Result<()> {
        if !self.connectivity.is_online() {
            tracing::debug!(%id, "offline, skipping immediate push");
            return Ok(());
        }

        let Some(product) = self.repo.get(id)? else {
            return Ok(());
        };
        if !product.sync_state.is_dirty() {
            return Ok(());
        }

        if let Err(error) = self.push_record(&product).await {
            tracing::warn!(%id, %error, "immediate push failed, record stays dirty");
        }
        Ok(())
    }

    /// Remove the remote document after a confirmed local hard-delete.
    ///
    /// Best-effort: a failure is logged, not retried, and never surfaced —
    /// the local delete is authoritative regardless of the remote outcome.
    pub async fn delete_remote(&self, id: ProductId) {
        if !self.connectivity.is_online() {
            tracing::debug!(%id, "offline, dropping remote delete");
            return;
        }

        if let Err(error) = self.remote.remove(id).await {
            tracing::warn!(%id, %error, "remote delete failed, local delete stands");
        }
    }

    async fn push_record(&self, product: &Product) -> Result<()> {
        let doc = RemoteProduct::from_product(product, now_millis());
        self.remote.put(&doc).await?;
        self.repo.mark_synced(product.id)?;
        Ok(())
    }
}
