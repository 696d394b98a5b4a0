//! Session tracker: the "is the user working right now" state machine.
//!
//! Two states: **Idle** (no open session) and **Running** (one open session,
//! tracking elapsed and last-activity time). Transitions:
//!
//! - `start` opens a new session; an already-running session is stopped
//!   first with its own elapsed duration.
//! - `stop` closes the open session with `duration = now - start_time`;
//!   no-op while Idle.
//! - `ensure_running_for_save` is the implicit auto-start: a save event
//!   while Idle opens a session and attributes the save to it.
//! - `check_inactivity` auto-stops once `now - last_activity` exceeds the
//!   configured threshold; the closed duration counts up to *now*, not up
//!   to the last activity.
//!
//! On construction the tracker resumes a still-open session found in the
//! store. This is a deliberate recovery step: a process restart during a
//! logically ongoing work session picks that session back up instead of
//! opening a second one.

use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::dates::now_epoch;
use crate::db::Store;
use crate::error::{Error, Result};
use crate::types::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running {
        session_id: SessionId,
        start_time: i64,
        last_activity: i64,
    },
}

/// Outcome of a stop: when the closed session started and how long it ran.
///
/// The start time lets callers invalidate the cached rollup for the date
/// the session belongs to, which is the date it started on even when the
/// stop lands after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoppedSession {
    pub start_time: i64,
    pub duration: i64,
}

/// Work-session state machine backed by the persistent store.
pub struct SessionTracker {
    store: Arc<Store>,
    inactivity_timeout_secs: i64,
    state: TimerState,
}

impl SessionTracker {
    /// Create a tracker, resuming a still-open session from the store if
    /// one exists.
    pub fn new(store: Arc<Store>, config: &TrackerConfig) -> Self {
        let mut tracker = Self {
            store,
            inactivity_timeout_secs: config.inactivity_timeout_secs,
            state: TimerState::Idle,
        };
        tracker.resume();
        tracker
    }

    /// Resume an in-flight session left open by a previous process.
    ///
    /// Store errors (including the unavailable store) leave the tracker
    /// Idle; resumption is best-effort.
    fn resume(&mut self) {
        let open = self.store.db().and_then(|db| db.active_session());
        match open {
            Ok(Some(session)) => {
                tracing::info!(session_id = session.id, "Resumed open session");
                self.state = TimerState::Running {
                    session_id: session.id,
                    start_time: session.start_time,
                    last_activity: now_epoch(),
                };
            }
            Ok(None) => {}
            Err(Error::StoreUnavailable) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to look up open session, starting Idle");
            }
        }
    }

    /// Whether a session is currently running.
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// The running session's id, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        match self.state {
            TimerState::Running { session_id, .. } => Some(session_id),
            TimerState::Idle => None,
        }
    }

    /// Seconds elapsed in the running session, 0 while Idle.
    pub fn elapsed(&self) -> i64 {
        match self.state {
            TimerState::Running { start_time, .. } => now_epoch() - start_time,
            TimerState::Idle => 0,
        }
    }

    /// Start a new session.
    ///
    /// A running session is stopped first (closed with its own elapsed
    /// duration). Surfaces the store error to the caller; the tracker
    /// falls back to Idle so a failed start never leaves phantom state.
    pub fn start(&mut self) -> Result<SessionId> {
        if self.is_running() {
            if let Err(e) = self.stop() {
                tracing::warn!(error = %e, "Failed to close previous session on restart");
            }
        }

        let now = now_epoch();
        match self.store.db().and_then(|db| db.create_session(now)) {
            Ok(session_id) => {
                self.state = TimerState::Running {
                    session_id,
                    start_time: now,
                    last_activity: now,
                };
                tracing::info!(session_id, "Session started");
                Ok(session_id)
            }
            Err(e) => {
                self.state = TimerState::Idle;
                Err(e)
            }
        }
    }

    /// Stop the running session, returning its start time and duration.
    ///
    /// No-op while Idle. The tracker transitions to Idle even when the
    /// store write fails; the open row will be resumed and re-closed later.
    pub fn stop(&mut self) -> Result<Option<StoppedSession>> {
        let TimerState::Running {
            session_id,
            start_time,
            ..
        } = self.state
        else {
            return Ok(None);
        };

        let now = now_epoch();
        let duration = now - start_time;
        self.state = TimerState::Idle;

        self.store
            .db()
            .and_then(|db| db.close_session(session_id, now, duration))?;
        tracing::info!(session_id, duration, "Session stopped");
        Ok(Some(StoppedSession {
            start_time,
            duration,
        }))
    }

    /// Toggle between Running and Idle.
    pub fn toggle(&mut self) -> Result<()> {
        if self.is_running() {
            self.stop()?;
        } else {
            self.start()?;
        }
        Ok(())
    }

    /// Handle a save event: refresh last-activity while Running, or
    /// auto-start a session while Idle.
    ///
    /// Returns the session id the save should be attributed to, or `None`
    /// when the store is unavailable (the recorder drops the edit).
    pub fn ensure_running_for_save(&mut self) -> Option<SessionId> {
        let now = now_epoch();
        match &mut self.state {
            TimerState::Running {
                session_id,
                last_activity,
                ..
            } => {
                *last_activity = now;
                Some(*session_id)
            }
            TimerState::Idle => match self.store.db().and_then(|db| db.create_session(now)) {
                Ok(session_id) => {
                    tracing::info!(session_id, "Session auto-started on save");
                    self.state = TimerState::Running {
                        session_id,
                        start_time: now,
                        last_activity: now,
                    };
                    Some(session_id)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Auto-start failed, save will not be recorded");
                    None
                }
            },
        }
    }

    /// Refresh the last-activity timestamp. No-op while Idle.
    pub fn record_activity(&mut self) {
        if let TimerState::Running { last_activity, .. } = &mut self.state {
            *last_activity = now_epoch();
        }
    }

    /// Close the session if it has been inactive past the threshold.
    ///
    /// The closed duration counts up to now, not up to the last activity.
    /// Returns the closed session's details when an auto-stop happened.
    pub fn check_inactivity(&mut self) -> Option<StoppedSession> {
        self.check_inactivity_at(now_epoch())
    }

    /// [`check_inactivity`](Self::check_inactivity) with an explicit "now".
    ///
    /// Saves can land through other processes while this one only runs the
    /// checker, so the in-memory timestamp alone would miss them. The
    /// store's most recent save for the session counts as activity too;
    /// the later of the two decides.
    pub fn check_inactivity_at(&mut self, now: i64) -> Option<StoppedSession> {
        let TimerState::Running {
            session_id,
            start_time,
            last_activity,
        } = self.state
        else {
            return None;
        };

        let last_save = self
            .store
            .db()
            .ok()
            .and_then(|db| db.last_save_for_session(session_id).ok().flatten());
        let last_seen = last_save.map_or(last_activity, |s| s.max(last_activity));

        let inactive_for = now - last_seen;
        if inactive_for < self.inactivity_timeout_secs {
            return None;
        }

        tracing::info!(inactive_for, "Session inactive past threshold, auto-stopping");
        match self.stop() {
            Ok(stopped) => stopped,
            Err(e) => {
                tracing::error!(error = %e, "Failed to auto-stop inactive session");
                // state is already Idle; the open row gets resumed next start
                Some(StoppedSession {
                    start_time,
                    duration: now - start_time,
                })
            }
        }
    }
}
