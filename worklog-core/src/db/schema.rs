//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations keyed by the `schema_version` table.
//! Migrations are additive and each pending one is applied inside a single
//! transaction at startup.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i64 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL PRIMARY KEY
    );

    -- Work sessions: one row per continuous span of tracked work.
    -- end_time/duration stay NULL while the session is open.
    CREATE TABLE IF NOT EXISTS sessions (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time  INTEGER NOT NULL,
        end_time    INTEGER,
        duration    INTEGER,
        created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
        updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );

    -- File-edit snapshots: one row per save event, holding the file's
    -- absolute line count at that moment (never a delta).
    CREATE TABLE IF NOT EXISTS file_edits (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id  INTEGER NOT NULL,
        file_path   TEXT NOT NULL,
        line_count  INTEGER NOT NULL,
        language    TEXT,
        saved_at    INTEGER NOT NULL,
        created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
        FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
    );

    -- Daily rollup cache, one row per local calendar date.
    CREATE TABLE IF NOT EXISTS daily_stats (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        date            TEXT NOT NULL UNIQUE,
        work_time       INTEGER NOT NULL DEFAULT 0,
        save_count      INTEGER NOT NULL DEFAULT 0,
        file_count      INTEGER NOT NULL DEFAULT 0,
        line_changes    INTEGER NOT NULL DEFAULT 0,
        language_ratios TEXT,
        created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
        updated_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_start_time ON sessions(start_time);
    CREATE INDEX IF NOT EXISTS idx_sessions_end_time ON sessions(end_time);
    CREATE INDEX IF NOT EXISTS idx_file_edits_session_id ON file_edits(session_id);
    CREATE INDEX IF NOT EXISTS idx_file_edits_saved_at ON file_edits(saved_at);
    CREATE INDEX IF NOT EXISTS idx_daily_stats_date ON daily_stats(date);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection) -> crate::error::Result<()> {
    let tx = conn.transaction()?;

    let current_version = get_schema_version(&tx);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i64;
        if version > current_version {
            tracing::info!(version, "Running migration");
            tx.execute_batch(migration)?;
        }
    }

    if current_version == 0 {
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;
    } else if current_version < SCHEMA_VERSION {
        tx.execute("UPDATE schema_version SET version = ?1", [SCHEMA_VERSION])?;
    }

    tx.commit()?;

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version, 0 when the version table does not exist yet
pub fn get_schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |r| {
        r.get(0)
    })
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();

        // Run migrations twice - should be idempotent
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();

        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        let tables = ["schema_version", "sessions", "file_edits", "daily_stats"];

        for table in tables {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_cascade_delete_removes_session_edits() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        run_migrations(&mut conn).unwrap();

        conn.execute("INSERT INTO sessions (start_time) VALUES (100)", [])
            .unwrap();
        conn.execute(
            "INSERT INTO file_edits (session_id, file_path, line_count, saved_at)
             VALUES (1, '/tmp/a.rs', 10, 110)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM sessions WHERE id = 1", []).unwrap();

        let edits: i64 = conn
            .query_row("SELECT COUNT(*) FROM file_edits", [], |r| r.get(0))
            .unwrap();
        assert_eq!(edits, 0, "cascade delete should remove the session's edits");
    }
}
