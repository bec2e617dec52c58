//! souq-core - Core library for Souq
//!
//! This crate contains the shared models, local store, and the
//! offline-first listing sync engine used by all Souq interfaces.

pub mod config;
pub mod connectivity;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod sync;
pub mod util;

pub use config::{FreshnessBasis, SyncConfig};
pub use error::{Error, Result};
pub use models::{Product, ProductDraft, ProductId, ProductStatus, SyncState};
pub use sync::{ProductChange, SyncOrchestrator};
