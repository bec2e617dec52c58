//! Offline-first bidirectional synchronization engine.
//!
//! Reconciles the local durable cache of product listings with the shared
//! remote document store, under unreliable connectivity, without central
//! locking. A local mutation marks its record `Dirty` and triggers an
//! immediate push for that one record; periodically (launch, explicit
//! refresh) the orchestrator pulls the full remote snapshot to absorb
//! changes made by other clients. Push and pull never run as one atomic
//! transaction; each record converges independently.

mod orchestrator;
mod pull;
mod push;

pub use orchestrator::{ProductChange, SyncOrchestrator};
pub use pull::{PullReconciler, PullStats};
pub use push::{PushReconciler, PushStats};
