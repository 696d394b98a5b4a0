//! Database layer for worklog
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations keyed by the `schema_version` table
//! - Repository pattern for queries
//! - A process-wide [`Store`] handle with an explicit degraded mode

pub mod repo;
pub mod schema;

pub use repo::Database;

use std::path::Path;

use crate::error::{Error, Result};

/// Process-wide store handle.
///
/// Opening and migrating happen once, at assembly time. If either fails the
/// store is permanently unavailable for the rest of the process: reads
/// degrade to empty/zero results, writes to logged no-ops. There is no
/// retry of initialization within a process lifetime.
pub struct Store {
    db: Option<Database>,
}

impl Store {
    /// Open the store at `path` and run migrations.
    ///
    /// Never fails: an open or migration error puts the handle into the
    /// unavailable state instead, so the rest of the system keeps working
    /// without persistence.
    pub fn open(path: &Path) -> Self {
        let opened = Database::open(path).and_then(|db| {
            db.migrate()?;
            Ok(db)
        });
        match opened {
            Ok(db) => Self { db: Some(db) },
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Store initialization failed, running without persistence"
                );
                Self { db: None }
            }
        }
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        db.migrate()?;
        Ok(Self { db: Some(db) })
    }

    /// A handle that is unavailable from the start (for testing the
    /// degraded paths)
    pub fn unavailable() -> Self {
        Self { db: None }
    }

    /// Whether the store came up successfully
    pub fn is_available(&self) -> bool {
        self.db.is_some()
    }

    /// Access the database, or `Error::StoreUnavailable` in degraded mode.
    ///
    /// Callers are expected to map the unavailable case to their own
    /// empty/zero result rather than propagating it to the user, except on
    /// explicit user-initiated writes.
    pub fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(Error::StoreUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_store_reports_unavailable() {
        let store = Store::unavailable();
        assert!(!store.is_available());
        assert!(matches!(store.db(), Err(Error::StoreUnavailable)));
    }

    #[test]
    fn test_in_memory_store_is_available() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.is_available());
        assert!(store.db().is_ok());
    }
}
