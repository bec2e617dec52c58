//! Product listing model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::FreshnessBasis;

/// A unique identifier for a product listing.
///
/// Assigned by the local store on creation (`AUTOINCREMENT`) and echoed
/// verbatim into the remote document key. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Get the raw integer value of this ID
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Lifecycle status of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Available,
    Sold,
    Paused,
}

impl ProductStatus {
    /// Stable string form used in the local store and on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            "paused" => Ok(Self::Paused),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

/// Synchronization state of a local record.
///
/// `Dirty` means the record has local changes not yet confirmed written to
/// the remote store. A `Dirty` record is never overwritten by incoming
/// remote data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Dirty,
    Synced,
}

impl SyncState {
    /// Integer form stored in the `sync_state` column
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Dirty => 0,
            Self::Synced => 1,
        }
    }

    /// Parse the stored integer form; anything non-zero counts as synced
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        if value == 0 {
            Self::Dirty
        } else {
            Self::Synced
        }
    }

    #[must_use]
    pub const fn is_dirty(self) -> bool {
        matches!(self, Self::Dirty)
    }
}

/// Geographic coordinates attached to a listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Caller-supplied fields for creating or editing a listing.
///
/// Identifier, timestamps, rating aggregates, and sync state are owned by
/// the store and never set directly by callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub owner_id: String,
    pub category: String,
    pub condition: String,
    pub image_paths: Vec<String>,
    pub location: String,
    pub coordinates: Option<GeoPoint>,
}

/// A product listing in the local store (unit of synchronization)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier, join key between local and remote stores
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub owner_id: String,
    pub category: String,
    pub condition: String,
    pub image_paths: Vec<String>,
    pub rating: f64,
    pub rating_count: i64,
    pub location: String,
    pub coordinates: Option<GeoPoint>,
    pub status: ProductStatus,
    /// Creation timestamp (Unix ms), set once and never bumped
    pub created_at: i64,
    /// Last local write timestamp (Unix ms), bumped on every local mutation
    pub last_modified_at: i64,
    /// Synchronization state
    pub sync_state: SyncState,
}

impl Product {
    /// The local timestamp a pulled remote document is compared against.
    ///
    /// `CreatedAt` reproduces the historical behavior where the creation
    /// timestamp doubled as the freshness marker, which misreads a
    /// locally-edited-then-synced record as older than its true edit time.
    /// `LastModified` is the corrected comparison key.
    #[must_use]
    pub const fn freshness_marker(&self, basis: FreshnessBasis) -> i64 {
        match basis {
            FreshnessBasis::CreatedAt => self.created_at,
            FreshnessBasis::LastModified => self.last_modified_at,
        }
    }
}
