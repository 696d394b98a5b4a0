//! Database repository layer
//!
//! Provides query and insert operations for the three record kinds:
//! sessions, file edits, and daily-stat rollups. Range queries take epoch
//! seconds; callers convert a local calendar date to a range with
//! [`crate::dates::day_bounds`] first.

use crate::dates;
use crate::error::{Error, Result};
use crate::types::{DailyStat, FileEdit, Session, SessionId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

/// Database handle wrapping a single serialized connection
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&mut conn)
    }

    // ============================================
    // Session operations
    // ============================================

    /// Insert a new, open session starting at `start_time`
    pub fn create_session(&self, start_time: i64) -> Result<SessionId> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO sessions (start_time, created_at, updated_at)
            VALUES (?1, strftime('%s', 'now'), strftime('%s', 'now'))
            "#,
            [start_time],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Close a session, recording its end time and total duration
    pub fn close_session(&self, id: SessionId, end_time: i64, duration: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            UPDATE sessions
            SET end_time = ?1, duration = ?2, updated_at = strftime('%s', 'now')
            WHERE id = ?3
            "#,
            params![end_time, duration, id],
        )?;
        Ok(())
    }

    /// Get a session by ID
    pub fn get_session(&self, id: SessionId) -> Result<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM sessions WHERE id = ?", [id], row_to_session)
            .optional()
            .map_err(Error::from)
    }

    /// Get sessions whose start_time falls in `[start, end]`
    pub fn sessions_in_range(&self, start: i64, end: i64) -> Result<Vec<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM sessions
            WHERE start_time >= ?1 AND start_time <= ?2
            ORDER BY start_time ASC
            "#,
        )?;
        let rows = stmt.query_map(params![start, end], row_to_session)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Get the open session, if any.
    ///
    /// At most one session is open at a time; if older open rows ever exist
    /// the most recently started one wins.
    pub fn active_session(&self) -> Result<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"
            SELECT * FROM sessions
            WHERE end_time IS NULL
            ORDER BY start_time DESC
            LIMIT 1
            "#,
            [],
            row_to_session,
        )
        .optional()
        .map_err(Error::from)
    }

    // ============================================
    // FileEdit operations
    // ============================================

    /// Insert one file-edit snapshot
    pub fn insert_file_edit(
        &self,
        session_id: SessionId,
        file_path: &str,
        line_count: i64,
        language: Option<&str>,
        saved_at: i64,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO file_edits (session_id, file_path, line_count, language, saved_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, strftime('%s', 'now'))
            "#,
            params![session_id, file_path, line_count, language, saved_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get all edits attributed to a session, oldest first
    pub fn edits_for_session(&self, session_id: SessionId) -> Result<Vec<FileEdit>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM file_edits
            WHERE session_id = ?1
            ORDER BY saved_at ASC
            "#,
        )?;
        let rows = stmt.query_map([session_id], row_to_edit)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Get edits whose saved_at falls in `[start, end]`, oldest first
    pub fn edits_in_range(&self, start: i64, end: i64) -> Result<Vec<FileEdit>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM file_edits
            WHERE saved_at >= ?1 AND saved_at <= ?2
            ORDER BY saved_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![start, end], row_to_edit)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Get the most recent save timestamp recorded for a session
    pub fn last_save_for_session(&self, session_id: SessionId) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT MAX(saved_at) FROM file_edits WHERE session_id = ?1",
            [session_id],
            |r| r.get::<_, Option<i64>>(0),
        )
        .map_err(Error::from)
    }

    /// Get the most recent edit snapshot recorded for a file path
    pub fn latest_edit_for_file(&self, file_path: &str) -> Result<Option<FileEdit>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"
            SELECT * FROM file_edits
            WHERE file_path = ?1
            ORDER BY saved_at DESC
            LIMIT 1
            "#,
            [file_path],
            row_to_edit,
        )
        .optional()
        .map_err(Error::from)
    }

    // ============================================
    // DailyStat operations
    // ============================================

    /// Get the cached rollup for a date
    pub fn get_daily_stat(&self, date: &str) -> Result<Option<DailyStat>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM daily_stats WHERE date = ?", [date], row_to_stat)
            .optional()
            .map_err(Error::from)
    }

    /// Insert or update the rollup for a date
    pub fn upsert_daily_stat(&self, stat: &DailyStat) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO daily_stats (date, work_time, save_count, file_count, line_changes,
                                     language_ratios, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%s', 'now'), strftime('%s', 'now'))
            ON CONFLICT(date) DO UPDATE SET
                work_time = excluded.work_time,
                save_count = excluded.save_count,
                file_count = excluded.file_count,
                line_changes = excluded.line_changes,
                language_ratios = excluded.language_ratios,
                updated_at = strftime('%s', 'now')
            "#,
            params![
                stat.date,
                stat.work_time,
                stat.save_count,
                stat.file_count,
                stat.line_changes,
                stat.language_ratios,
            ],
        )?;
        Ok(())
    }

    /// Delete the cached rollup for a date (cache invalidation)
    pub fn delete_daily_stat(&self, date: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM daily_stats WHERE date = ?", [date])?;
        Ok(())
    }

    /// Get cached rollups for a range of dates, newest first
    pub fn daily_stats_in_range(&self, start_date: &str, end_date: &str) -> Result<Vec<DailyStat>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM daily_stats
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date DESC
            "#,
        )?;
        let rows = stmt.query_map(params![start_date, end_date], row_to_stat)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Delete one day's data: its rollup, its edits, and its *closed*
    /// sessions. An open session is never deleted by a reset.
    pub fn reset_day(&self, date: &str) -> Result<()> {
        let (start, end) = dates::day_bounds(date)?;
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM daily_stats WHERE date = ?", [date])?;
        tx.execute(
            "DELETE FROM file_edits WHERE saved_at >= ?1 AND saved_at <= ?2",
            params![start, end],
        )?;
        tx.execute(
            "DELETE FROM sessions
             WHERE start_time >= ?1 AND start_time <= ?2 AND end_time IS NOT NULL",
            params![start, end],
        )?;

        tx.commit()?;
        tracing::info!(date, "Daily data reset");
        Ok(())
    }
}

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        duration: row.get("duration")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_edit(row: &Row) -> rusqlite::Result<FileEdit> {
    Ok(FileEdit {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        file_path: row.get("file_path")?,
        line_count: row.get("line_count")?,
        language: row.get("language")?,
        saved_at: row.get("saved_at")?,
        created_at: row.get("created_at")?,
    })
}

fn row_to_stat(row: &Row) -> rusqlite::Result<DailyStat> {
    Ok(DailyStat {
        id: row.get("id")?,
        date: row.get("date")?,
        work_time: row.get("work_time")?,
        save_count: row.get("save_count")?,
        file_count: row.get("file_count")?,
        line_changes: row.get("line_changes")?,
        language_ratios: row.get("language_ratios")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_session_lifecycle() {
        let db = test_db();

        let id = db.create_session(1_000).unwrap();
        let session = db.get_session(id).unwrap().unwrap();
        assert!(session.is_open());
        assert_eq!(session.start_time, 1_000);

        let active = db.active_session().unwrap().unwrap();
        assert_eq!(active.id, id);

        db.close_session(id, 2_200, 1_200).unwrap();
        let session = db.get_session(id).unwrap().unwrap();
        assert!(!session.is_open());
        assert_eq!(session.end_time, Some(2_200));
        assert_eq!(session.duration, Some(1_200));
        assert!(db.active_session().unwrap().is_none());
    }

    #[test]
    fn test_sessions_in_range_filters_by_start_time() {
        let db = test_db();
        db.create_session(100).unwrap();
        db.create_session(500).unwrap();
        db.create_session(1_000).unwrap();

        let hits = db.sessions_in_range(200, 900).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start_time, 500);
    }

    #[test]
    fn test_edit_queries() {
        let db = test_db();
        let sid = db.create_session(100).unwrap();
        db.insert_file_edit(sid, "/p/a.rs", 10, Some("Rust"), 150).unwrap();
        db.insert_file_edit(sid, "/p/b.rs", 5, Some("Rust"), 250).unwrap();
        db.insert_file_edit(sid, "/p/a.rs", 12, Some("Rust"), 350).unwrap();

        let by_session = db.edits_for_session(sid).unwrap();
        assert_eq!(by_session.len(), 3);
        assert!(by_session.windows(2).all(|w| w[0].saved_at <= w[1].saved_at));

        let in_range = db.edits_in_range(200, 400).unwrap();
        assert_eq!(in_range.len(), 2);

        let latest = db.latest_edit_for_file("/p/a.rs").unwrap().unwrap();
        assert_eq!(latest.line_count, 12);
    }

    #[test]
    fn test_last_save_for_session() {
        let db = test_db();
        let sid = db.create_session(100).unwrap();
        assert_eq!(db.last_save_for_session(sid).unwrap(), None);

        db.insert_file_edit(sid, "/p/a.rs", 10, Some("Rust"), 150).unwrap();
        db.insert_file_edit(sid, "/p/b.rs", 5, Some("Rust"), 250).unwrap();
        assert_eq!(db.last_save_for_session(sid).unwrap(), Some(250));
    }

    #[test]
    fn test_daily_stat_upsert_is_unique_per_date() {
        let db = test_db();

        let mut stat = crate::types::DailyStat::empty("2026-01-15", 0);
        stat.work_time = 100;
        stat.save_count = 2;
        db.upsert_daily_stat(&stat).unwrap();

        stat.work_time = 300;
        db.upsert_daily_stat(&stat).unwrap();

        let rows = db.daily_stats_in_range("2026-01-01", "2026-01-31").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].work_time, 300);

        db.delete_daily_stat("2026-01-15").unwrap();
        assert!(db.get_daily_stat("2026-01-15").unwrap().is_none());
    }
}
