//! End-to-end sync engine flow against an in-memory remote store.

use std::sync::Arc;
use std::time::Duration;

use souq_core::connectivity::SharedConnectivity;
use souq_core::db::{Database, ProductRepository, SqliteProductRepository};
use souq_core::remote::MemoryRemoteStore;
use souq_core::sync::SyncOrchestrator;
use souq_core::{ProductChange, ProductDraft, SyncConfig, SyncState};

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

fn bike(price: f64) -> ProductDraft {
    ProductDraft {
        title: "Bike".to_string(),
        description: "City bike".to_string(),
        price,
        owner_id: "user-1".to_string(),
        category: "vehicles".to_string(),
        condition: "used".to_string(),
        ..ProductDraft::default()
    }
}

// The canonical lifecycle: push a fresh listing, absorb an external remote
// edit, then verify an unpushed local edit survives a pull untouched.
#[tokio::test]
async fn bike_price_negotiation_round_trip() {
    let h = setup(true);

    // Local create, still dirty
    let product = h.repo.create(&bike(500.0)).unwrap();
    assert_eq!(product.sync_state, SyncState::Dirty);

    // Push: remote gets a complete snapshot stamped at push time
    let stats = h.orchestrator.sync_all_unsynced().await.unwrap();
    assert_eq!(stats.pushed, 1);
    let doc = h.remote.document(product.id).unwrap();
    assert_eq!(doc.price, 500.0);
    assert!(doc.last_updated >= product.created_at);
    assert_eq!(
        h.repo.get(product.id).unwrap().unwrap().sync_state,
        SyncState::Synced
    );

    // Another client lowers the price
    let mut edited = doc.clone();
    edited.price = 450.0;
    edited.last_updated = doc.last_updated + 10;
    h.remote.seed(edited);

    let stats = h.orchestrator.full_refresh().await.unwrap();
    assert_eq!(stats.updated, 1);
    let local = h.repo.get(product.id).unwrap().unwrap();
    assert_eq!(local.price, 450.0);
    assert_eq!(local.sync_state, SyncState::Synced);

    // Local counter-offer, not yet pushed
    h.repo.update_fields(product.id, &bike(400.0)).unwrap();

    // A pull before the push must not clobber the local edit
    h.orchestrator.full_refresh().await.unwrap();
    let local = h.repo.get(product.id).unwrap().unwrap();
    assert_eq!(local.price, 400.0);
    assert_eq!(local.sync_state, SyncState::Dirty);
    assert_eq!(h.remote.document(product.id).unwrap().price, 450.0);

    // The next push converges both sides
    h.orchestrator.sync_all_unsynced().await.unwrap();
    assert_eq!(h.remote.document(product.id).unwrap().price, 400.0);
    assert_eq!(
        h.repo.get(product.id).unwrap().unwrap().sync_state,
        SyncState::Synced
    );
}

// Repeated push/pull cycles with connectivity flapping still converge once
// the network holds.
#[tokio::test]
async fn convergence_across_connectivity_gaps() {
    let h = setup(false);
    let first = h.repo.create(&bike(500.0)).unwrap();
    let second = h.repo.create(&bike(120.0)).unwrap();

    // Offline attempts change nothing
    h.orchestrator.sync_all_unsynced().await.unwrap();
    h.orchestrator.full_refresh().await.unwrap();
    assert_eq!(h.orchestrator.pending_sync_count().unwrap(), 2);
    assert_eq!(h.remote.document_count(), 0);

    // Back online, one record's first upload fails
    h.connectivity.set_online(true);
    h.remote.fail_writes_for(second.id);
    let stats = h.orchestrator.sync_all_unsynced().await.unwrap();
    assert_eq!(stats.pushed, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(h.orchestrator.pending_sync_count().unwrap(), 1);

    // The retry cycle picks up only the failed record
    h.remote.clear_failures(second.id);
    let stats = h.orchestrator.sync_all_unsynced().await.unwrap();
    assert_eq!(stats.pushed, 1);
    assert_eq!(h.orchestrator.pending_sync_count().unwrap(), 0);
    assert_eq!(h.remote.document_count(), 2);

    // Nothing left to do; no further remote writes
    let writes = h.remote.put_calls();
    h.orchestrator.sync_all_unsynced().await.unwrap();
    assert_eq!(h.remote.put_calls(), writes);
    assert!(h.repo.get(first.id).unwrap().is_some());
}

// Hard delete: the local row goes first, then exactly one best-effort
// remote removal; a removal failure never resurrects the local record.
#[tokio::test]
async fn delete_propagation_is_one_shot() {
    let h = setup(true);
    let product = h.repo.create(&bike(500.0)).unwrap();
    h.orchestrator.sync_all_unsynced().await.unwrap();

    h.repo.delete(product.id).unwrap();
    h.remote.fail_writes_for(product.id);
    h.orchestrator
        .immediate_sync(ProductChange::Deleted(product.id))
        .await
        .unwrap();

    assert_eq!(h.remote.remove_calls(), 1);
    assert!(h.repo.get(product.id).unwrap().is_none());
    // The orphaned remote document is not retried by this engine
    assert!(h.remote.document(product.id).is_some());
}
