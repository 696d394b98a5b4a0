//! Core domain types for worklog
//!
//! Three record kinds make up the data model:
//!
//! | Term | Definition |
//! |------|------------|
//! | **Session** | One continuous span of tracked work time, open (no end) or closed |
//! | **FileEdit** | An immutable snapshot of a file's line count at one save event |
//! | **DailyStat** | A cached, date-keyed rollup of session and edit data |
//!
//! All timestamps are UTC epoch seconds. Dates are local-timezone calendar
//! dates in `YYYY-MM-DD` form; the conversion between the two lives in
//! [`crate::dates`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store-assigned row identifier.
pub type SessionId = i64;

/// Language name mapped to an integer percentage of total snapshot lines.
///
/// Percentages are rounded independently, so they may sum to slightly less
/// (or more) than 100.
pub type LanguageRatios = BTreeMap<String, u32>;

// ============================================
// Session
// ============================================

/// One continuous span of active work.
///
/// At most one session is open (`end_time == None`) at any moment. Once
/// closed, `duration == end_time - start_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned identifier (monotonic)
    pub id: SessionId,
    /// Start of the span (epoch seconds)
    pub start_time: i64,
    /// End of the span; `None` while the session is still active
    pub end_time: Option<i64>,
    /// Total seconds worked; `None` while the session is still active
    pub duration: Option<i64>,
    /// Row creation timestamp
    pub created_at: i64,
    /// Row update timestamp
    pub updated_at: i64,
}

impl Session {
    /// Whether this session is still open.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

// ============================================
// FileEdit
// ============================================

/// One snapshot of a file's state at a save event.
///
/// `line_count` is always the file's full line count at save time, never a
/// delta. Deltas are derived by the aggregator and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEdit {
    /// Store-assigned identifier
    pub id: i64,
    /// Session this save was attributed to
    pub session_id: SessionId,
    /// Absolute path of the saved file
    pub file_path: String,
    /// Full line count of the file at save time
    pub line_count: i64,
    /// Detected language, if any
    pub language: Option<String>,
    /// When the save happened (epoch seconds)
    pub saved_at: i64,
    /// Row creation timestamp
    pub created_at: i64,
}

// ============================================
// DailyStat
// ============================================

/// Cached rollup for one local calendar date.
///
/// At most one row exists per date. The language-ratio map is stored as a
/// JSON object in `language_ratios`, `None` when no edit carried a language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    /// Store-assigned identifier (0 for a freshly computed, unsaved value)
    pub id: i64,
    /// Local calendar date, `YYYY-MM-DD` (unique key)
    pub date: String,
    /// Total work time in seconds
    pub work_time: i64,
    /// Number of save events
    pub save_count: i64,
    /// Number of distinct files touched
    pub file_count: i64,
    /// Net line changes (positive-only consecutive-snapshot deltas)
    pub line_changes: i64,
    /// Serialized language-ratio map, `None` when empty
    pub language_ratios: Option<String>,
    /// Row creation timestamp
    pub created_at: i64,
    /// Row update timestamp
    pub updated_at: i64,
}

impl DailyStat {
    /// An all-zero stat for a date with no recorded activity.
    pub fn empty(date: &str, now: i64) -> Self {
        Self {
            id: 0,
            date: date.to_string(),
            work_time: 0,
            save_count: 0,
            file_count: 0,
            line_changes: 0,
            language_ratios: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse the stored language-ratio payload.
    ///
    /// A malformed payload is treated as an empty map and logged; it is
    /// never fatal.
    pub fn ratios(&self) -> LanguageRatios {
        match &self.language_ratios {
            Some(raw) => match serde_json::from_str(raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(date = %self.date, error = %e, "Malformed language_ratios payload, treating as empty");
                    LanguageRatios::new()
                }
            },
            None => LanguageRatios::new(),
        }
    }

    /// Whether this rollup represents any activity worth caching.
    pub fn has_activity(&self) -> bool {
        self.save_count > 0 || self.work_time > 0
    }
}
