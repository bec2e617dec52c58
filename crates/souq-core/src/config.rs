//! Sync engine configuration

use std::time::Duration;

use crate::util::{is_http_url, normalize_text_option};

/// Default per-request timeout for remote store calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay inserted between successive record uploads to avoid bursting the
/// remote API
pub const DEFAULT_PUSH_THROTTLE: Duration = Duration::from_millis(100);

/// App-settle delay before the launch-time push runs
pub const DEFAULT_LIGHT_SYNC_DELAY: Duration = Duration::from_secs(2);

/// Which local timestamp a pulled remote document is compared against.
///
/// The historical client compared `lastUpdated` against the record's
/// creation timestamp, so a locally-edited-then-synced record could be
/// misjudged as older than its true edit time and lose to a stale remote
/// value. Both interpretations are kept so callers (and tests) can pin
/// either one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreshnessBasis {
    /// Compare against `created_at` (historical behavior)
    CreatedAt,
    /// Compare against `last_modified_at` (corrected behavior)
    #[default]
    LastModified,
}

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote document store base URL (e.g. `https://souq.example.com`).
    /// `None` disables all remote operations.
    pub remote_base_url: Option<String>,
    /// Per-request timeout budget for remote reads/writes
    pub request_timeout: Duration,
    /// Delay between successive record uploads within one push cycle
    pub push_throttle: Duration,
    /// Delay before the launch-time push runs
    pub light_sync_delay: Duration,
    /// Pull-merge freshness comparison key
    pub pull_freshness: FreshnessBasis,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            push_throttle: DEFAULT_PUSH_THROTTLE,
            light_sync_delay: DEFAULT_LIGHT_SYNC_DELAY,
            pull_freshness: FreshnessBasis::default(),
        }
    }
}

impl SyncConfig {
    /// Create a configuration pointed at the given remote base URL
    pub fn new(remote_base_url: impl Into<String>) -> Self {
        Self {
            remote_base_url: normalize_text_option(Some(remote_base_url.into())),
            ..Self::default()
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the delay between successive record uploads
    #[must_use]
    pub const fn with_push_throttle(mut self, throttle: Duration) -> Self {
        self.push_throttle = throttle;
        self
    }

    /// Set the app-settle delay before the launch-time push
    #[must_use]
    pub const fn with_light_sync_delay(mut self, delay: Duration) -> Self {
        self.light_sync_delay = delay;
        self
    }

    /// Set the pull-merge freshness comparison key
    #[must_use]
    pub const fn with_pull_freshness(mut self, basis: FreshnessBasis) -> Self {
        self.pull_freshness = basis;
        self
    }

    /// Check if a remote store is configured with a plausible URL
    pub fn is_remote_configured(&self) -> bool {
        self.remote_base_url.as_deref().is_some_and(is_http_url)
    }
}
