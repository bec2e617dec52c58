//! Remote document store client
//!
//! The remote store is a shared keyed document collection, reachable only
//! when connectivity is present. Its per-document write is a whole-document
//! replace (last writer wins); reads are one-shot snapshots, never
//! subscriptions.

mod http;
mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProductId, RemoteProduct};

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

/// One-shot request/response interface to the shared document collection
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the entire collection as a single snapshot
    async fn fetch_all(&self) -> Result<Vec<RemoteProduct>>;

    /// Replace the document keyed by the record id (atomic whole-document
    /// write)
    async fn put(&self, doc: &RemoteProduct) -> Result<()>;

    /// Remove the document keyed by the record id
    async fn remove(&self, id: ProductId) -> Result<()>;
}
