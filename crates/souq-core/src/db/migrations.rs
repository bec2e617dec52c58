//! Database migrations

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Migration to version 1: Initial listing schema
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY
         );
         CREATE TABLE IF NOT EXISTS products (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             title TEXT NOT NULL,
             description TEXT NOT NULL DEFAULT '',
             price REAL NOT NULL,
             owner_id TEXT NOT NULL,
             category TEXT NOT NULL DEFAULT '',
             condition TEXT NOT NULL DEFAULT '',
             image_paths TEXT NOT NULL DEFAULT '[]',
             rating REAL NOT NULL DEFAULT 0,
             rating_count INTEGER NOT NULL DEFAULT 0,
             location TEXT NOT NULL DEFAULT '',
             latitude REAL,
             longitude REAL,
             status TEXT NOT NULL DEFAULT 'available',
             created_at INTEGER NOT NULL,
             sync_state INTEGER NOT NULL DEFAULT 0
         );
         CREATE INDEX IF NOT EXISTS idx_products_sync_state ON products(sync_state);
         CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at DESC);
         INSERT INTO schema_version (version) VALUES (1);
         COMMIT;",
    )?;

    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: distinct last-local-write timestamp
///
/// The pull merge originally compared the remote `lastUpdated` against
/// `created_at`; this adds the column the corrected comparison uses.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
         ALTER TABLE products ADD COLUMN last_modified_at INTEGER NOT NULL DEFAULT 0;
         UPDATE products SET last_modified_at = created_at WHERE last_modified_at = 0;
         INSERT INTO schema_version (version) VALUES (2);
         COMMIT;",
    )?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_migrations() {
        let conn = setup();
        run(&conn).unwrap();

        let version = get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = setup();
        run(&conn).unwrap();
        run(&conn).unwrap(); // Should not fail

        let version = get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migration_v2_backfills_last_modified() {
        let conn = setup();
        migrate_v1(&conn).unwrap();

        conn.execute(
            "INSERT INTO products (title, description, price, owner_id, category,
             condition, image_paths, location, status, created_at, sync_state)
             VALUES ('Bike', '', 500.0, 'u1', 'vehicles', 'used', '[]', '', 'available', 1234, 0)",
            [],
        )
        .unwrap();

        migrate_v2(&conn).unwrap();

        let backfilled: i64 = conn
            .query_row(
                "SELECT last_modified_at FROM products WHERE title = 'Bike'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(backfilled, 1234);
    }
}
