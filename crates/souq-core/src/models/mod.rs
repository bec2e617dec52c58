//! Data models for souq-core

mod product;
mod remote;

pub use product::{GeoPoint, Product, ProductDraft, ProductId, ProductStatus, SyncState};
pub use remote::RemoteProduct;
