//! Edit recorder: persists one per-save file snapshot.
//!
//! Each snapshot is the absolute state of one file at one save (total
//! counted lines), never a delta. Deltas are derived later by the
//! aggregator from consecutive snapshots of the same path.

use std::sync::Arc;

use crate::db::Store;
use crate::error::Result;

/// Records per-save file snapshots against a session.
pub struct EditRecorder {
    store: Arc<Store>,
}

impl EditRecorder {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Record a save snapshot for `file_path`.
    ///
    /// An explicit `session_id` (normally resolved via the tracker's save
    /// hook) wins; without one the open session is looked up. A save with
    /// no session to attribute it to is dropped silently. Returns the
    /// snapshot row id when one was written.
    pub fn record(
        &self,
        file_path: &str,
        line_count: i64,
        language: Option<&str>,
        session_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let session_id = match session_id {
            Some(id) => Some(id),
            None => self
                .store
                .db()
                .ok()
                .and_then(|db| db.active_session().ok().flatten())
                .map(|s| s.id),
        };
        let Some(session_id) = session_id else {
            tracing::debug!(file_path, "No active session, dropping save snapshot");
            return Ok(None);
        };

        let saved_at = crate::dates::now_epoch();
        let id = self
            .store
            .db()?
            .insert_file_edit(session_id, file_path, line_count, language, saved_at)?;
        tracing::debug!(file_path, line_count, session_id, "Recorded save snapshot");
        Ok(Some(id))
    }
}
