//! Daily statistics aggregation
//!
//! Rolls sessions and file-edit snapshots up into one [`DailyStat`] per
//! local calendar date, with a cache in the `daily_stats` table.
//!
//! Cache policy: a cached row is served as-is, except while a session that
//! started inside the queried date is still open. An open session accrues
//! work time continuously (`now - start_time`), so a cached value would go
//! stale the moment it was written; those queries recompute instead. The
//! recomputed value is written back only when the day has any activity, so
//! an idle day never creates a row.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::dates::{self, now_epoch};
use crate::db::Store;
use crate::error::{Error, Result};
use crate::types::{DailyStat, FileEdit, LanguageRatios};

// ============================================
// Pure rollup helpers
// ============================================

/// Net line changes across a day's snapshots.
///
/// Snapshots are grouped per file path in save order. Within each file,
/// every consecutive pair contributes `max(0, current - previous)`; the
/// first snapshot of a file has no predecessor and contributes nothing.
/// Shrinking a file never subtracts.
pub fn net_line_changes(edits: &[FileEdit]) -> i64 {
    let mut last_seen: HashMap<&str, i64> = HashMap::new();
    let mut total = 0;
    for edit in edits {
        if let Some(prev) = last_seen.get(edit.file_path.as_str()) {
            let delta = edit.line_count - prev;
            if delta > 0 {
                total += delta;
            }
        }
        last_seen.insert(&edit.file_path, edit.line_count);
    }
    total
}

/// Per-language percentage breakdown of a day's snapshots.
///
/// Sums the absolute line counts of every snapshot that carries a language
/// (a path saved five times counts five times) and rounds each language's
/// share to a whole percent independently. Languages that round to zero are
/// still included; snapshots with no language are excluded entirely.
pub fn language_ratios(edits: &[FileEdit]) -> LanguageRatios {
    let mut per_language: BTreeMap<&str, i64> = BTreeMap::new();
    for edit in edits {
        if let Some(lang) = &edit.language {
            *per_language.entry(lang.as_str()).or_insert(0) += edit.line_count;
        }
    }

    let total: i64 = per_language.values().sum();
    if total <= 0 {
        return LanguageRatios::new();
    }

    per_language
        .into_iter()
        .map(|(lang, lines)| {
            let pct = (lines as f64 / total as f64 * 100.0).round() as u32;
            (lang.to_string(), pct)
        })
        .collect()
}

// ============================================
// Aggregator
// ============================================

/// Computes and caches per-date rollups.
pub struct DailyAggregator {
    store: Arc<Store>,
}

impl DailyAggregator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The rollup for `date` (a local `YYYY-MM-DD` date).
    ///
    /// Serves the cached row when one exists and no open session started
    /// inside the date; otherwise recomputes from the raw records and
    /// writes the result back if the day has activity. With the store
    /// unavailable this returns an all-zero stat.
    pub fn aggregate(&self, date: &str) -> Result<DailyStat> {
        self.aggregate_at(date, now_epoch())
    }

    /// Like [`aggregate`](Self::aggregate) with an explicit "now", so the
    /// open-session accrual is testable.
    pub fn aggregate_at(&self, date: &str, now: i64) -> Result<DailyStat> {
        let db = match self.store.db() {
            Ok(db) => db,
            Err(Error::StoreUnavailable) => {
                tracing::debug!(date, "Store unavailable, serving empty rollup");
                return Ok(DailyStat::empty(date, now));
            }
            Err(e) => return Err(e),
        };

        let (start, end) = dates::day_bounds(date)?;

        // An open session started today makes the cache stale by definition.
        let open_in_range = matches!(
            db.active_session()?,
            Some(s) if s.start_time >= start && s.start_time <= end
        );

        if !open_in_range {
            if let Some(cached) = db.get_daily_stat(date)? {
                tracing::debug!(date, "Serving cached daily stat");
                return Ok(cached);
            }
        }

        let stat = self.compute_at(date, now)?;
        if stat.has_activity() {
            db.upsert_daily_stat(&stat)?;
        }
        Ok(stat)
    }

    /// Recompute the rollup for `date` from raw sessions and edits,
    /// ignoring the cache.
    pub fn compute_at(&self, date: &str, now: i64) -> Result<DailyStat> {
        let db = self.store.db()?;
        let (start, end) = dates::day_bounds(date)?;

        let sessions = db.sessions_in_range(start, end)?;
        let edits = db.edits_in_range(start, end)?;

        let mut work_time = 0;
        for session in &sessions {
            work_time += match session.duration {
                Some(d) => d,
                // still open: accrue up to the query moment
                None => now - session.start_time,
            };
        }

        let file_count = edits
            .iter()
            .map(|e| e.file_path.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;

        let ratios = language_ratios(&edits);
        let language_ratios = if ratios.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&ratios)?)
        };

        Ok(DailyStat {
            id: 0,
            date: date.to_string(),
            work_time,
            save_count: edits.len() as i64,
            file_count,
            line_changes: net_line_changes(&edits),
            language_ratios,
            created_at: now,
            updated_at: now,
        })
    }

    /// Cached rollups between `start_date` and `end_date` inclusive,
    /// newest first.
    ///
    /// Reads the cache only: days that were never cached (no activity, or
    /// invalidated and not re-queried) do not appear. Empty when the store
    /// is unavailable.
    pub fn history(&self, start_date: &str, end_date: &str) -> Result<Vec<DailyStat>> {
        match self.store.db() {
            Ok(db) => db.daily_stats_in_range(start_date, end_date),
            Err(Error::StoreUnavailable) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Drop the cached rollup for `date`, forcing the next query to
    /// recompute. Harmless when no row exists or the store is unavailable.
    pub fn invalidate(&self, date: &str) -> Result<()> {
        match self.store.db() {
            Ok(db) => db.delete_daily_stat(date),
            Err(Error::StoreUnavailable) => {
                tracing::debug!(date, "Store unavailable, nothing to invalidate");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete one day's records: the cached rollup, the day's edits, and
    /// the day's closed sessions. An open session survives a reset.
    pub fn reset_day(&self, date: &str) -> Result<()> {
        self.store.db()?.reset_day(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::day_bounds;

    fn edit(path: &str, lines: i64, language: Option<&str>, saved_at: i64) -> FileEdit {
        FileEdit {
            id: 0,
            session_id: 1,
            file_path: path.to_string(),
            line_count: lines,
            language: language.map(String::from),
            saved_at,
            created_at: saved_at,
        }
    }

    #[test]
    fn test_net_line_changes_positive_deltas_only() {
        // 10 -> 7 (shrink, ignored) -> 15 (+8); first snapshot contributes 0
        let edits = vec![
            edit("/p/a.rs", 10, Some("Rust"), 100),
            edit("/p/a.rs", 7, Some("Rust"), 200),
            edit("/p/a.rs", 15, Some("Rust"), 300),
        ];
        assert_eq!(net_line_changes(&edits), 8);
    }

    #[test]
    fn test_net_line_changes_tracks_files_independently() {
        let edits = vec![
            edit("/p/a.rs", 10, Some("Rust"), 100),
            edit("/p/b.rs", 20, Some("Rust"), 150),
            edit("/p/a.rs", 14, Some("Rust"), 200),
            edit("/p/b.rs", 18, Some("Rust"), 250),
        ];
        // a: +4, b: shrink ignored
        assert_eq!(net_line_changes(&edits), 4);
    }

    #[test]
    fn test_language_ratios_rounding() {
        let edits = vec![
            edit("/p/a.rs", 30, Some("Rust"), 100),
            edit("/p/b.ts", 70, Some("TypeScript"), 200),
        ];
        let ratios = language_ratios(&edits);
        assert_eq!(ratios.get("Rust"), Some(&30));
        assert_eq!(ratios.get("TypeScript"), Some(&70));
    }

    #[test]
    fn test_language_ratios_skip_unknown_language() {
        let edits = vec![
            edit("/p/a.rs", 50, Some("Rust"), 100),
            edit("/p/Makefile", 50, None, 200),
        ];
        let ratios = language_ratios(&edits);
        assert_eq!(ratios.len(), 1);
        assert_eq!(ratios.get("Rust"), Some(&100));
    }

    #[test]
    fn test_language_ratios_empty_without_languages() {
        assert!(language_ratios(&[]).is_empty());
        let edits = vec![edit("/p/Makefile", 50, None, 100)];
        assert!(language_ratios(&edits).is_empty());
    }

    fn aggregator() -> (DailyAggregator, Arc<Store>) {
        let store = Arc::new(Store::open_in_memory().unwrap());
        (DailyAggregator::new(Arc::clone(&store)), store)
    }

    #[test]
    fn test_empty_day_is_zero_and_not_cached() {
        let (agg, store) = aggregator();
        let stat = agg.aggregate("2026-03-10").unwrap();
        assert_eq!(stat.work_time, 0);
        assert_eq!(stat.save_count, 0);
        assert!(store.db().unwrap().get_daily_stat("2026-03-10").unwrap().is_none());
    }

    #[test]
    fn test_closed_day_is_cached_and_served_from_cache() {
        let (agg, store) = aggregator();
        let db = store.db().unwrap();
        let (start, _) = day_bounds("2026-03-10").unwrap();

        let sid = db.create_session(start + 100).unwrap();
        db.close_session(sid, start + 1_300, 1_200).unwrap();
        db.insert_file_edit(sid, "/p/a.rs", 40, Some("Rust"), start + 200).unwrap();

        let first = agg.aggregate("2026-03-10").unwrap();
        assert_eq!(first.work_time, 1_200);
        assert_eq!(first.save_count, 1);
        assert!(db.get_daily_stat("2026-03-10").unwrap().is_some());

        // new raw data without invalidation: the cache still wins
        db.insert_file_edit(sid, "/p/b.rs", 10, Some("Rust"), start + 400).unwrap();
        let second = agg.aggregate("2026-03-10").unwrap();
        assert_eq!(second.save_count, 1);

        // invalidation forces the recompute to see it
        agg.invalidate("2026-03-10").unwrap();
        let third = agg.aggregate("2026-03-10").unwrap();
        assert_eq!(third.save_count, 2);
    }

    #[test]
    fn test_open_session_bypasses_cache_and_accrues() {
        let (agg, store) = aggregator();
        let db = store.db().unwrap();
        let date = crate::dates::local_today();
        let (start, _) = day_bounds(&date).unwrap();

        db.create_session(start + 100).unwrap();

        let early = agg.aggregate_at(&date, start + 225).unwrap();
        assert_eq!(early.work_time, 125);

        let later = agg.aggregate_at(&date, start + 900).unwrap();
        assert_eq!(later.work_time, 800);
        assert!(later.work_time >= early.work_time);
    }

    #[test]
    fn test_history_serves_cached_rows_newest_first() {
        let (agg, store) = aggregator();
        let db = store.db().unwrap();

        let mut stat = crate::types::DailyStat::empty("2026-03-08", 0);
        stat.work_time = 100;
        db.upsert_daily_stat(&stat).unwrap();
        stat.date = "2026-03-10".to_string();
        db.upsert_daily_stat(&stat).unwrap();
        stat.date = "2026-03-20".to_string();
        db.upsert_daily_stat(&stat).unwrap();

        let rows = agg.history("2026-03-08", "2026-03-14").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2026-03-10");
        assert_eq!(rows[1].date, "2026-03-08");
    }

    #[test]
    fn test_unavailable_store_yields_empty_stat() {
        let agg = DailyAggregator::new(Arc::new(Store::unavailable()));
        let stat = agg.aggregate("2026-03-10").unwrap();
        assert!(!stat.has_activity());
        agg.invalidate("2026-03-10").unwrap();
        assert!(agg.history("2026-03-01", "2026-03-31").unwrap().is_empty());
    }
}
