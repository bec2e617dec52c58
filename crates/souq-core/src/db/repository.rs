//! Product repository implementation

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{
    GeoPoint, Product, ProductDraft, ProductId, ProductStatus, RemoteProduct, SyncState,
};
use crate::util::now_millis;

use super::Database;

/// Trait for product listing storage operations.
///
/// Every local mutation (create, edit, status change) leaves the record
/// `Dirty`; only a confirmed remote write or an accepted remote value moves
/// it back to `Synced`.
pub trait ProductRepository: Send + Sync {
    /// Insert a new listing; the store assigns the id and marks it `Dirty`
    fn create(&self, draft: &ProductDraft) -> Result<Product>;

    /// Get a listing by ID
    fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// List all listings, newest first
    fn list(&self) -> Result<Vec<Product>>;

    /// Overwrite the caller-editable fields and mark the record `Dirty`
    fn update_fields(&self, id: ProductId, draft: &ProductDraft) -> Result<Product>;

    /// Change the lifecycle status and mark the record `Dirty`
    fn set_status(&self, id: ProductId, status: ProductStatus) -> Result<Product>;

    /// Hard-delete the local row
    fn delete(&self, id: ProductId) -> Result<()>;

    /// All records with unconfirmed local changes, in id order
    fn list_dirty(&self) -> Result<Vec<Product>>;

    /// Number of records awaiting a confirmed remote write
    fn pending_count(&self) -> Result<usize>;

    /// Transition `Dirty` -> `Synced` after a confirmed remote write.
    ///
    /// The transition is a single conditional UPDATE, so a concurrent push
    /// of the same record observes exactly one winner. Returns whether the
    /// transition happened.
    fn mark_synced(&self, id: ProductId) -> Result<bool>;

    /// Force a record back to `Dirty` (re-queue for push)
    fn mark_dirty(&self, id: ProductId) -> Result<()>;

    /// Insert a remote document the local store has never seen, as `Synced`
    fn insert_remote(&self, doc: &RemoteProduct) -> Result<()>;

    /// Accept a remote document as authoritative: overwrite the mutable
    /// fields, adopt its `lastUpdated` as the local write marker, and mark
    /// the record `Synced`
    fn apply_remote(&self, doc: &RemoteProduct) -> Result<()>;
}

const PRODUCT_COLUMNS: &str = "id, title, description, price, owner_id, category, condition, \
     image_paths, rating, rating_count, location, latitude, longitude, status, \
     created_at, last_modified_at, sync_state";

/// `SQLite` implementation of `ProductRepository`
pub struct SqliteProductRepository {
    db: Arc<Database>,
}

impl SqliteProductRepository {
    /// Create a new repository backed by the given database
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Parse a product from a database row
    fn parse_product(row: &Row<'_>) -> rusqlite::Result<Product> {
        let image_paths: String = row.get(7)?;
        let image_paths: Vec<String> = serde_json::from_str(&image_paths).unwrap_or_default();

        let latitude: Option<f64> = row.get(11)?;
        let longitude: Option<f64> = row.get(12)?;
        let coordinates = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let status: String = row.get(13)?;
        let status: ProductStatus = status.parse().map_err(|message: String| {
            rusqlite::Error::FromSqlConversionFailure(
                13,
                rusqlite::types::Type::Text,
                message.into(),
            )
        })?;

        Ok(Product {
            id: ProductId(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            owner_id: row.get(4)?,
            category: row.get(5)?,
            condition: row.get(6)?,
            image_paths,
            rating: row.get(8)?,
            rating_count: row.get(9)?,
            location: row.get(10)?,
            coordinates,
            status,
            created_at: row.get(14)?,
            last_modified_at: row.get(15)?,
            sync_state: SyncState::from_i64(row.get(16)?),
        })
    }

    fn get_with_conn(conn: &Connection, id: ProductId) -> Result<Option<Product>> {
        let result = conn.query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"),
            params![id.as_i64()],
            Self::parse_product,
        );

        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ProductRepository for SqliteProductRepository {
    fn create(&self, draft: &ProductDraft) -> Result<Product> {
        let now = now_millis();
        let image_paths = serde_json::to_string(&draft.image_paths)?;

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO products (title, description, price, owner_id, category, condition,
             image_paths, location, latitude, longitude, status, created_at,
             last_modified_at, sync_state)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                draft.title,
                draft.description,
                draft.price,
                draft.owner_id,
                draft.category,
                draft.condition,
                image_paths,
                draft.location,
                draft.coordinates.map(|c| c.latitude),
                draft.coordinates.map(|c| c.longitude),
                ProductStatus::Available.as_str(),
                now,
                now,
                SyncState::Dirty.as_i64(),
            ],
        )?;

        let id = ProductId(conn.last_insert_rowid());
        Self::get_with_conn(&conn, id)?.ok_or(Error::NotFound(id.as_i64()))
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let conn = self.db.connection()?;
        Self::get_with_conn(&conn, id)
    }

    fn list(&self) -> Result<Vec<Product>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))?;

        let products = stmt
            .query_map([], Self::parse_product)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(products)
    }

    fn update_fields(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        let now = now_millis();
        let image_paths = serde_json::to_string(&draft.image_paths)?;

        let conn = self.db.connection()?;
        let rows = conn.execute(
            "UPDATE products SET title = ?, description = ?, price = ?, category = ?,
             condition = ?, image_paths = ?, location = ?, latitude = ?, longitude = ?,
             last_modified_at = ?, sync_state = ?
             WHERE id = ?",
            params![
                draft.title,
                draft.description,
                draft.price,
                draft.category,
                draft.condition,
                image_paths,
                draft.location,
                draft.coordinates.map(|c| c.latitude),
                draft.coordinates.map(|c| c.longitude),
                now,
                SyncState::Dirty.as_i64(),
                id.as_i64(),
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.as_i64()));
        }

        Self::get_with_conn(&conn, id)?.ok_or(Error::NotFound(id.as_i64()))
    }

    fn set_status(&self, id: ProductId, status: ProductStatus) -> Result<Product> {
        let now = now_millis();

        let conn = self.db.connection()?;
        let rows = conn.execute(
            "UPDATE products SET status = ?, last_modified_at = ?, sync_state = ? WHERE id = ?",
            params![
                status.as_str(),
                now,
                SyncState::Dirty.as_i64(),
                id.as_i64()
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.as_i64()));
        }

        Self::get_with_conn(&conn, id)?.ok_or(Error::NotFound(id.as_i64()))
    }

    fn delete(&self, id: ProductId) -> Result<()> {
        let conn = self.db.connection()?;
        let rows = conn.execute("DELETE FROM products WHERE id = ?", params![id.as_i64()])?;

        if rows == 0 {
            return Err(Error::NotFound(id.as_i64()));
        }

        Ok(())
    }

    fn list_dirty(&self) -> Result<Vec<Product>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sync_state = ? ORDER BY id ASC"
        ))?;

        let products = stmt
            .query_map(params![SyncState::Dirty.as_i64()], Self::parse_product)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(products)
    }

    fn pending_count(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM products WHERE sync_state = ?",
            params![SyncState::Dirty.as_i64()],
            |row| row.get(0),
        )?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn mark_synced(&self, id: ProductId) -> Result<bool> {
        let conn = self.db.connection()?;
        let rows = conn.execute(
            "UPDATE products SET sync_state = ? WHERE id = ? AND sync_state = ?",
            params![
                SyncState::Synced.as_i64(),
                id.as_i64(),
                SyncState::Dirty.as_i64()
            ],
        )?;

        Ok(rows > 0)
    }

    fn mark_dirty(&self, id: ProductId) -> Result<()> {
        let conn = self.db.connection()?;
        let rows = conn.execute(
            "UPDATE products SET sync_state = ?, last_modified_at = ? WHERE id = ?",
            params![SyncState::Dirty.as_i64(), now_millis(), id.as_i64()],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.as_i64()));
        }

        Ok(())
    }

    fn insert_remote(&self, doc: &RemoteProduct) -> Result<()> {
        let image_paths = serde_json::to_string(&doc.image_paths)?;

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO products (id, title, description, price, owner_id, category, condition,
             image_paths, rating, rating_count, location, latitude, longitude, status,
             created_at, last_modified_at, sync_state)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                doc.id,
                doc.title,
                doc.description,
                doc.price,
                doc.owner_id,
                doc.category,
                doc.condition,
                image_paths,
                doc.rating,
                doc.rating_count,
                doc.location,
                doc.latitude,
                doc.longitude,
                doc.status.as_str(),
                doc.created_at,
                doc.last_updated,
                SyncState::Synced.as_i64(),
            ],
        )?;

        Ok(())
    }

    fn apply_remote(&self, doc: &RemoteProduct) -> Result<()> {
        let image_paths = serde_json::to_string(&doc.image_paths)?;

        let conn = self.db.connection()?;
        let rows = conn.execute(
            "UPDATE products SET title = ?, description = ?, price = ?, category = ?,
             condition = ?, image_paths = ?, rating = ?, rating_count = ?, location = ?,
             latitude = ?, longitude = ?, status = ?, last_modified_at = ?, sync_state = ?
             WHERE id = ?",
            params![
                doc.title,
                doc.description,
                doc.price,
                doc.category,
                doc.condition,
                image_paths,
                doc.rating,
                doc.rating_count,
                doc.location,
                doc.latitude,
                doc.longitude,
                doc.status.as_str(),
                doc.last_updated,
                SyncState::Synced.as_i64(),
                doc.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(doc.id));
        }

        Ok(())
    }
}
