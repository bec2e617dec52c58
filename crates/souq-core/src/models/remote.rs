//! Remote document wire shape
//!
//! The remote store holds one flat camelCase JSON document per listing,
//! keyed by the local record id. Every document is a complete snapshot;
//! there are no partial or field-level documents.

use serde::{Deserialize, Serialize};

use super::{GeoPoint, Product, ProductId, ProductStatus};

/// A product listing as stored in the remote document collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub owner_id: String,
    pub category: String,
    pub condition: String,
    #[serde(default)]
    pub image_paths: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: i64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub status: ProductStatus,
    /// Creation timestamp of the record (Unix ms), carried through unchanged
    pub created_at: i64,
    /// Wall-clock timestamp stamped at push time (Unix ms); the
    /// last-writer-wins comparison key
    pub last_updated: i64,
}

impl RemoteProduct {
    /// Serialize a local record to the remote document shape.
    ///
    /// `last_updated` is the push-time wall clock, distinct from the
    /// record's own timestamps.
    #[must_use]
    pub fn from_product(product: &Product, last_updated: i64) -> Self {
        Self {
            id: product.id.as_i64(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            owner_id: product.owner_id.clone(),
            category: product.category.clone(),
            condition: product.condition.clone(),
            image_paths: product.image_paths.clone(),
            rating: product.rating,
            rating_count: product.rating_count,
            location: product.location.clone(),
            latitude: product.coordinates.map(|c| c.latitude),
            longitude: product.coordinates.map(|c| c.longitude),
            status: product.status,
            created_at: product.created_at,
            last_updated,
        }
    }

    /// The local-store identifier this document belongs to
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        ProductId(self.id)
    }

    /// Coordinates, when both components are present
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}
