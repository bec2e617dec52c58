//! Network reachability oracle
//!
//! Every remote operation is gated on [`Connectivity::is_online`] immediately
//! before it runs. The check is synchronous, cheap, and never errors; when it
//! reports `false` the operation skips silently without marking anything as
//! synced or failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reports current network reachability
pub trait Connectivity: Send + Sync {
    /// `true` when the remote store is believed reachable
    fn is_online(&self) -> bool;
}

/// Connectivity that always reports online (tests, trusted environments)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Shared flag flipped by the platform's reachability callback.
///
/// Absence of capability reports offline, so a freshly constructed value
/// defaults to `false` until the platform says otherwise.
#[derive(Debug, Clone, Default)]
pub struct SharedConnectivity {
    online: Arc<AtomicBool>,
}

impl SharedConnectivity {
    /// Create a new flag with the given initial state
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    /// Update the reachability state
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Connectivity for SharedConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_offline() {
        let connectivity = SharedConnectivity::default();
        assert!(!connectivity.is_online());
    }

    #[test]
    fn test_shared_across_clones() {
        let connectivity = SharedConnectivity::new(false);
        let clone = connectivity.clone();
        connectivity.set_online(true);
        assert!(clone.is_online());
    }

    #[test]
    fn test_always_online() {
        assert!(AlwaysOnline.is_online());
    }
}
