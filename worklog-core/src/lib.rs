//! # worklog-core
//!
//! Core library for worklog - a work-activity tracker built around save
//! events and work sessions.
//!
//! This library provides:
//! - Domain types for sessions, file-edit snapshots, and daily rollups
//! - Database storage layer with SQLite and an explicit degraded mode
//! - Session tracking with inactivity auto-stop
//! - Daily statistics aggregation with a per-date cache
//! - Summary presentation and Slack webhook delivery
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Raw records (sessions and per-save snapshots) are append-heavy and
//! written as events happen. Daily rollups are derived from them on demand
//! and cached per local calendar date; the cache is invalidated rather than
//! incrementally updated whenever the raw records change.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use worklog_core::{Config, DailyAggregator, Store};
//!
//! let config = Config::load().expect("failed to load config");
//! let store = Arc::new(Store::open(&Config::database_path()));
//!
//! let aggregator = DailyAggregator::new(store);
//! let today = worklog_core::dates::local_today();
//! let stat = aggregator.aggregate(&today).expect("aggregation failed");
//! println!("worked {}s today", stat.work_time);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, Store};
pub use error::{Error, Result};
pub use recorder::EditRecorder;
pub use stats::DailyAggregator;
pub use tracker::SessionTracker;
pub use types::*;

// Public modules
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod logging;
pub mod measure;
pub mod recorder;
pub mod slack;
pub mod stats;
pub mod summary;
pub mod tracker;
pub mod types;
