//! Sync orchestrator
//!
//! Owns the two reconcilers and the scheduling policy layered on top of
//! them. Each operation is independently triggerable and safe to invoke
//! concurrently with the others; push and pull never run as one atomic
//! transaction, so each record transitions on its own.
//!
//! Background triggers run as explicit tokio tasks whose handles the
//! orchestrator retains; [`SyncOrchestrator::shutdown`] joins them so no
//! work leaks past an app-lifecycle teardown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::connectivity::Connectivity;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::models::ProductId;
use crate::remote::RemoteStore;

use super::pull::{PullReconciler, PullStats};
use super::push::{PushReconciler, PushStats};

/// A completed local mutation that needs to reach the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductChange {
    /// Created, edited, or status-changed locally; the row is `Dirty`
    Written(ProductId),
    /// Hard-deleted locally; the remote document should be removed
    Deleted(ProductId),
}

pub struct SyncOrchestrator {
    push: PushReconciler,
    pull: PullReconciler,
    repo: Arc<dyn ProductRepository>,
    light_sync_delay: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncOrchestrator {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        config: &SyncConfig,
    ) -> Self {
        let push = PushReconciler::new(
            repo.clone(),
            remote.clone(),
            connectivity.clone(),
            config.push_throttle,
        );
        let pull = PullReconciler::new(
            repo.clone(),
            remote,
            connectivity,
            config.pull_freshness,
        );
        Self {
            push,
            pull,
            repo,
            light_sync_delay: config.light_sync_delay,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Launch-time sync: wait for the app to settle, then push local
    /// changes only. Never pulls, so freshly-typed local drafts are not
    /// racing a network round trip on cold start.
    pub async fn light_sync(&self) -> Result<PushStats> {
        tokio::time::sleep(self.light_sync_delay).await;
        self.push.push_unsynced().await
    }

    /// Explicit user-triggered refresh: absorb remote changes made by
    /// other clients.
    pub async fn full_refresh(&self) -> Result<PullStats> {
        self.pull.pull_all().await
    }

    /// Pull-to-refresh entry point
    pub async fn refresh(&self) -> Result<()> {
        self.full_refresh().await.map(|_| ())
    }

    /// Sync a single record right after a local mutation completes.
    ///
    /// This is the target of the `onProductWritten` hook at product
    /// mutation call sites.
    pub async fn immediate_sync(&self, change: ProductChange) -> Result<()> {
        match change {
            ProductChange::Written(id) => self.push.push_one(id).await,
            ProductChange::Deleted(id) => {
                self.push.delete_remote(id).await;
                Ok(())
            }
        }
    }

    /// Manual catch-up: push every record still awaiting a confirmed
    /// remote write.
    pub async fn sync_all_unsynced(&self) -> Result<PushStats> {
        self.push.push_unsynced().await
    }

    /// Number of records with unconfirmed local changes (UI badge)
    pub fn pending_sync_count(&self) -> Result<usize> {
        self.repo.pending_count()
    }

    /// Run the launch-time sync in the background
    pub fn spawn_light_sync(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.track(tokio::spawn(async move {
            if let Err(error) = this.light_sync().await {
                tracing::warn!(%error, "background light sync failed");
            }
        }));
    }

    /// Run an immediate single-record sync in the background
    pub fn spawn_immediate(self: &Arc<Self>, change: ProductChange) {
        let this = Arc::clone(self);
        self.track(tokio::spawn(async move {
            if let Err(error) = this.immediate_sync(change).await {
                tracing::warn!(%error, "background immediate sync failed");
            }
        }));
    }

    /// Await every outstanding background task.
    ///
    /// Call on app-lifecycle teardown so in-flight uploads finish instead of
    /// being dropped mid-write.
    pub async fn shutdown(&self) {
        let handles = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => return,
        };
        for handle in handles {
            if let Err(error) = handle.await {
                tracing::warn!(%error, "background sync task panicked");
            }
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let Ok(mut tasks) = self.tasks.lock() else {
            return;
        };
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::SharedConnectivity;
    use crate::db::{Database, SqliteProductRepository};
    use crate::models::{ProductDraft, SyncState};
    use crate::remote::MemoryRemoteStore;
    use pretty_assertions::assert_eq;

    struct Harness {
        repo: Arc<SqliteProductRepository>,
        remote: Arc<MemoryRemoteStore>,
        connectivity: SharedConnectivity,
        orchestrator: Arc<SyncOrchestrator>,
    }

    fn setup(online: bool) -> Harness {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let repo = Arc::new(SqliteProductRepository::new(db));
        let remote = Arc::new(MemoryRemoteStore::new());
        let connectivity = SharedConnectivity::new(online);
        let config = SyncConfig::default()
            .with_push_throttle(Duration::ZERO)
            .with_light_sync_delay(Duration::ZERO);
        let orchestrator = Arc::new(SyncOrchestrator::new(
            repo.clone(),
            remote.clone(),
            Arc::new(connectivity.clone()),
            &config,
        ));
        Harness {
            repo,
            remote,
            connectivity,
            orchestrator,
        }
    }

    fn draft(title: &str) -> ProductDraft {
        ProductDraft {
            title: title.to_string(),
            price: 500.0,
            owner_id: "user-1".to_string(),
            category: "vehicles".to_string(),
            condition: "used".to_string(),
            ..ProductDraft::default()
        }
    }

    #[tokio::test]
    async fn test_light_sync_pushes_without_pulling() {
        let h = setup(true);
        h.repo.create(&draft("Bike")).unwrap();

        let stats = h.orchestrator.light_sync().await.unwrap();
        assert_eq!(stats.pushed, 1);
        assert_eq!(h.remote.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_immediate_sync_written_and_deleted() {
        let h = setup(true);
        let product = h.repo.create(&draft("Bike")).unwrap();

        h.orchestrator
            .immediate_sync(ProductChange::Written(product.id))
            .await
            .unwrap();
        assert!(h.remote.document(product.id).is_some());

        h.repo.delete(product.id).unwrap();
        h.orchestrator
            .immediate_sync(ProductChange::Deleted(product.id))
            .await
            .unwrap();
        assert!(h.remote.document(product.id).is_none());
        assert_eq!(h.remote.remove_calls(), 1);
    }

    #[tokio::test]
    async fn test_offline_operations_touch_nothing() {
        let h = setup(false);
        let product = h.repo.create(&draft("Bike")).unwrap();

        h.orchestrator.light_sync().await.unwrap();
        h.orchestrator.full_refresh().await.unwrap();
        h.orchestrator
            .immediate_sync(ProductChange::Written(product.id))
            .await
            .unwrap();
        h.orchestrator.sync_all_unsynced().await.unwrap();

        assert_eq!(h.remote.put_calls(), 0);
        assert_eq!(h.remote.fetch_calls(), 0);
        assert_eq!(h.remote.remove_calls(), 0);
        assert_eq!(
            h.repo.get(product.id).unwrap().unwrap().sync_state,
            SyncState::Dirty
        );
    }

    #[tokio::test]
    async fn test_pending_count_tracks_dirty_rows() {
        let h = setup(true);
        h.repo.create(&draft("Bike")).unwrap();
        h.repo.create(&draft("Lamp")).unwrap();
        assert_eq!(h.orchestrator.pending_sync_count().unwrap(), 2);

        h.orchestrator.sync_all_unsynced().await.unwrap();
        assert_eq!(h.orchestrator.pending_sync_count().unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawned_work_is_joined_on_shutdown() {
        let h = setup(true);
        let product = h.repo.create(&draft("Bike")).unwrap();

        h.orchestrator
            .spawn_immediate(ProductChange::Written(product.id));
        h.orchestrator.shutdown().await;

        assert!(h.remote.document(product.id).is_some());
        assert_eq!(
            h.repo.get(product.id).unwrap().unwrap().sync_state,
            SyncState::Synced
        );
    }

    #[tokio::test]
    async fn test_refresh_pulls_remote_changes() {
        let h = setup(true);
        let product = h.repo.create(&draft("Bike")).unwrap();
        h.orchestrator.sync_all_unsynced().await.unwrap();

        // Another client edits the document
        let mut doc = h.remote.document(product.id).unwrap();
        doc.price = 450.0;
        doc.last_updated += 1;
        h.remote.seed(doc);

        h.orchestrator.refresh().await.unwrap();
        assert_eq!(h.repo.get(product.id).unwrap().unwrap().price, 450.0);
    }

    #[tokio::test]
    async fn test_connectivity_flip_mid_session() {
        let h = setup(false);
        let product = h.repo.create(&draft("Bike")).unwrap();

        h.orchestrator.sync_all_unsynced().await.unwrap();
        assert_eq!(h.remote.put_calls(), 0);

        h.connectivity.set_online(true);
        let stats = h.orchestrator.sync_all_unsynced().await.unwrap();
        assert_eq!(stats.pushed, 1);
        assert!(h.remote.document(product.id).is_some());
    }
}
