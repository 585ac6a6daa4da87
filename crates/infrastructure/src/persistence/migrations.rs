//! Database migrations
//!
//! Manages database schema versioning and migrations.
//!
//! ## Adding New Migrations
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a new `migrate_vX` function
//! 3. Add it to the `MIGRATIONS` table

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::connection::DatabaseError;

/// Current schema version
const SCHEMA_VERSION: i32 = 3;

type Migration = fn(&Connection) -> Result<(), DatabaseError>;

/// Migrations in application order: (version, description, function)
const MIGRATIONS: &[(i32, &str, Migration)] = &[
    (1, "drafts", migrate_v1),
    (2, "prompt queue", migrate_v2),
    (3, "cache storage", migrate_v3),
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_schema_version(conn)?;

    if current_version >= SCHEMA_VERSION {
        debug!(version = current_version, "Database schema is up to date");
        return Ok(());
    }

    info!(
        from_version = current_version,
        to_version = SCHEMA_VERSION,
        "Running database migrations"
    );

    for (version, description, migrate) in MIGRATIONS {
        if current_version >= *version {
            continue;
        }
        if let Err(e) = migrate(conn) {
            error!(
                version,
                description,
                error = %e,
                "Migration failed"
            );
            return Err(e);
        }
        set_schema_version(conn, *version)?;
    }

    info!(version = SCHEMA_VERSION, "Database migrations complete");
    Ok(())
}

/// Get current schema version
fn get_schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Set schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration to version 1: autosaved drafts
///
/// AUTOINCREMENT keeps ids monotonic even after retention deletes the
/// newest rowid.
fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V001: drafts");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS drafts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            input TEXT NOT NULL,
            options TEXT NOT NULL DEFAULT '{}',
            timestamp INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_drafts_timestamp ON drafts(timestamp);
        ",
    )?;

    Ok(())
}

/// Migration to version 2: prompts queued while offline
fn migrate_v2(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V002: prompt queue");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prompt_queue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            input TEXT NOT NULL,
            options TEXT NOT NULL DEFAULT '{}',
            queued_at INTEGER NOT NULL
        );
        ",
    )?;

    Ok(())
}

/// Migration to version 3: named response caches
fn migrate_v3(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V003: cache storage");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS caches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS cache_entries (
            cache_id INTEGER NOT NULL REFERENCES caches(id) ON DELETE CASCADE,
            request_key TEXT NOT NULL,
            method TEXT NOT NULL,
            url TEXT NOT NULL,
            status INTEGER NOT NULL,
            headers TEXT NOT NULL DEFAULT '[]',
            body BLOB NOT NULL,
            stored_at INTEGER NOT NULL,
            PRIMARY KEY (cache_id, request_key)
        );

        CREATE INDEX IF NOT EXISTS idx_cache_entries_key ON cache_entries(request_key);
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(Result::ok)
            .collect()
    }

    #[test]
    fn run_migrations_creates_tables() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();

        let tables = table_names(&conn);
        for expected in ["drafts", "prompt_queue", "caches", "cache_entries"] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn schema_version_tracked() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn partial_schema_is_completed() {
        let conn = create_test_connection();
        migrate_v1(&conn).unwrap();
        set_schema_version(&conn, 1).unwrap();

        run_migrations(&conn).unwrap();

        assert!(table_names(&conn).contains(&"cache_entries".to_string()));
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn draft_ids_are_not_reused_after_delete() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO drafts (input, timestamp) VALUES ('a', 1)",
            [],
        )
        .unwrap();
        let first = conn.last_insert_rowid();
        conn.execute("DELETE FROM drafts", []).unwrap();
        conn.execute(
            "INSERT INTO drafts (input, timestamp) VALUES ('b', 2)",
            [],
        )
        .unwrap();

        assert!(conn.last_insert_rowid() > first);
    }

    #[test]
    fn deleting_cache_cascades_to_entries() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();

        conn.execute("INSERT INTO caches (name) VALUES ('runtime')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO cache_entries (cache_id, request_key, method, url, status, body, stored_at)
             VALUES (1, 'k', 'GET', '/', 200, x'00', 0)",
            [],
        )
        .unwrap();
        conn.execute("DELETE FROM caches WHERE name = 'runtime'", [])
            .unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
