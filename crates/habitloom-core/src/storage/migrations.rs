//! Database schema migrations for habitloom.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration
//! version.

use rusqlite::{params, Connection, Result as SqliteResult};

use crate::badge::catalog;

/// Apply all pending migrations to bring the database to the current
/// schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// The base tables are created by HabitDb::migrate() directly; this
/// migration only marks the baseline version.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: Seed the built-in badge catalog.
///
/// Uses INSERT OR IGNORE on stable slug ids so re-running the seed (or a
/// later catalog addition re-seeding here) never duplicates or overwrites
/// existing definitions.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    for def in catalog::default_definitions() {
        tx.execute(
            "INSERT OR IGNORE INTO badge_definitions
                 (id, name, category, rarity, threshold, secret)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                def.id,
                def.name,
                def.category.as_str(),
                def.rarity.as_str(),
                def.threshold,
                def.secret,
            ],
        )?;
    }

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE badge_definitions (
                id        TEXT PRIMARY KEY,
                name      TEXT NOT NULL,
                category  TEXT NOT NULL,
                rarity    TEXT NOT NULL,
                threshold INTEGER NOT NULL,
                secret    INTEGER NOT NULL DEFAULT 0
            );",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_migrate_seeds_badges_once() {
        let conn = memory_conn();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM badge_definitions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, catalog::default_definitions().len());
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
    }
}
