//! In-memory remote store used by tests and local development.
//!
//! Tracks call counts so tests can assert on exact remote traffic (e.g.
//! idempotent push performs zero additional writes), and supports per-id
//! write-failure injection to exercise partial-failure paths.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{ProductId, RemoteProduct};

use super::RemoteStore;

#[derive(Default)]
pub struct MemoryRemoteStore {
    docs: Mutex<BTreeMap<i64, RemoteProduct>>,
    failing: Mutex<HashSet<i64>>,
    fetch_calls: AtomicUsize,
    put_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl MemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document as if another client had pushed it
    pub fn seed(&self, doc: RemoteProduct) {
        self.docs
            .lock()
            .expect("memory remote store lock")
            .insert(doc.id, doc);
    }

    /// Get a stored document by id
    pub fn document(&self, id: ProductId) -> Option<RemoteProduct> {
        self.docs
            .lock()
            .expect("memory remote store lock")
            .get(&id.as_i64())
            .cloned()
    }

    /// Number of stored documents
    pub fn document_count(&self) -> usize {
        self.docs.lock().expect("memory remote store lock").len()
    }

    /// Make writes and removals for the given id fail until cleared
    pub fn fail_writes_for(&self, id: ProductId) {
        self.failing
            .lock()
            .expect("memory remote store lock")
            .insert(id.as_i64());
    }

    /// Stop failing writes for the given id
    pub fn clear_failures(&self, id: ProductId) {
        self.failing
            .lock()
            .expect("memory remote store lock")
            .remove(&id.as_i64());
    }

    /// Total snapshot fetches attempted
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Total document writes attempted (including injected failures)
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::Relaxed)
    }

    /// Total document removals attempted (including injected failures)
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::Relaxed)
    }

    fn is_failing(&self, id: i64) -> bool {
        self.failing
            .lock()
            .expect("memory remote store lock")
            .contains(&id)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_all(&self) -> Result<Vec<RemoteProduct>> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        let docs = self.docs.lock().expect("memory remote store lock");
        Ok(docs.values().cloned().collect())
    }

    async fn put(&self, doc: &RemoteProduct) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
        if self.is_failing(doc.id) {
            return Err(Error::Remote(format!("injected write failure for {}", doc.id)));
        }
        self.docs
            .lock()
            .expect("memory remote store lock")
            .insert(doc.id, doc.clone());
        Ok(())
    }

    async fn remove(&self, id: ProductId) -> Result<()> {
        self.remove_calls.fetch_add(1, Ordering::Relaxed);
        if self.is_failing(id.as_i64()) {
            return Err(Error::Remote(format!("injected remove failure for {id}")));
        }
        self.docs
            .lock()
            .expect("memory remote store lock")
            .remove(&id.as_i64());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;

    fn doc(id: i64) -> RemoteProduct {
        RemoteProduct {
            id,
            title: "Bike".to_string(),
            description: String::new(),
            price: 500.0,
            owner_id: "u1".to_string(),
            category: "vehicles".to_string(),
            condition: "used".to_string(),
            image_paths: vec![],
            rating: 0.0,
            rating_count: 0,
            location: String::new(),
            latitude: None,
            longitude: None,
            status: ProductStatus::Available,
            created_at: 1000,
            last_updated: 2000,
        }
    }

    #[tokio::test]
    async fn test_put_and_fetch() {
        let store = MemoryRemoteStore::new();
        store.put(&doc(1)).await.unwrap();
        store.put(&doc(2)).await.unwrap();

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.put_calls(), 2);
        assert_eq!(store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection_counts_attempts() {
        let store = MemoryRemoteStore::new();
        store.fail_writes_for(ProductId(1));

        assert!(store.put(&doc(1)).await.is_err());
        assert_eq!(store.put_calls(), 1);
        assert_eq!(store.document_count(), 0);

        store.clear_failures(ProductId(1));
        store.put(&doc(1)).await.unwrap();
        assert_eq!(store.document_count(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryRemoteStore::new();
        store.put(&doc(1)).await.unwrap();
        store.remove(ProductId(1)).await.unwrap();
        assert_eq!(store.document_count(), 0);
        assert_eq!(store.remove_calls(), 1);
    }
}
