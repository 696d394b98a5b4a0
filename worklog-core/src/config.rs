//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/worklog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/worklog/` (~/.config/worklog/)
//! - Data: `$XDG_DATA_HOME/worklog/` (~/.local/share/worklog/)
//! - State/Logs: `$XDG_STATE_HOME/worklog/` (~/.local/state/worklog/)
//!
//! Time-of-day settings (`auto_post_time`, `reset_time`) are validated
//! against `HH:mm` 24-hour format; invalid values fall back to their
//! documented defaults rather than erroring.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Validate a time-of-day string against `HH:mm` 24-hour format.
pub fn is_valid_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let (hh, mm) = (&value[..2], &value[3..]);
    match (hh.parse::<u32>(), mm.parse::<u32>()) {
        (Ok(h), Ok(m)) => {
            hh.chars().all(|c| c.is_ascii_digit())
                && mm.chars().all(|c| c.is_ascii_digit())
                && h < 24
                && m < 60
        }
        _ => false,
    }
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Per-metric display toggles and theme
    #[serde(default)]
    pub display: DisplayConfig,

    /// Slack webhook and auto-post configuration
    #[serde(default)]
    pub slack: SlackConfig,

    /// Daily-reset configuration
    #[serde(default)]
    pub reset: ResetConfig,

    /// Session tracker configuration
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Panel theme selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Orange,
    Blue,
    Green,
    Monochrome,
}

/// Per-metric display toggles for the panel and the webhook message
#[derive(Debug, Deserialize, Clone, serde::Serialize)]
pub struct DisplayConfig {
    /// Show total work time
    #[serde(default = "default_true")]
    pub work_time: bool,

    /// Show save count
    #[serde(default = "default_true")]
    pub save_count: bool,

    /// Show distinct file count
    #[serde(default = "default_true")]
    pub file_count: bool,

    /// Show net line changes
    #[serde(default = "default_true")]
    pub line_changes: bool,

    /// Show the language-ratio breakdown
    #[serde(default = "default_true")]
    pub language_ratio: bool,

    /// Show the edited-file list
    #[serde(default = "default_true")]
    pub file_list: bool,

    /// Panel theme
    #[serde(default)]
    pub theme: Theme,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            work_time: true,
            save_count: true,
            file_count: true,
            line_changes: true,
            language_ratio: true,
            file_list: true,
            theme: Theme::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Slack webhook and auto-post configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    /// Incoming webhook URL (`https://hooks.slack.com/...`)
    pub webhook_url: Option<String>,

    /// Display name override; empty means the OS user name
    #[serde(default)]
    pub user_name: String,

    /// Free-form daily comment appended to the posted summary
    #[serde(default)]
    pub daily_comment: String,

    /// Enable the scheduled daily post
    #[serde(default)]
    pub auto_post_enabled: bool,

    /// Local time of day for the scheduled post, `HH:mm`
    #[serde(default = "default_auto_post_time")]
    pub auto_post_time: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            user_name: String::new(),
            daily_comment: String::new(),
            auto_post_enabled: false,
            auto_post_time: default_auto_post_time(),
        }
    }
}

fn default_auto_post_time() -> String {
    "18:00".to_string()
}

impl SlackConfig {
    /// The auto-post time, falling back to the default when the configured
    /// value is not valid `HH:mm`.
    pub fn auto_post_time(&self) -> &str {
        if is_valid_hhmm(&self.auto_post_time) {
            &self.auto_post_time
        } else {
            "18:00"
        }
    }

    /// The display name used in posted summaries: the configured override,
    /// or the OS user name, or a generic fallback.
    pub fn display_name(&self) -> String {
        if !self.user_name.is_empty() {
            return self.user_name.clone();
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "developer".to_string())
    }
}

/// Daily-reset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ResetConfig {
    /// Local time of day the tracked day rolls over, `HH:mm`
    #[serde(default = "default_reset_time")]
    pub reset_time: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            reset_time: default_reset_time(),
        }
    }
}

fn default_reset_time() -> String {
    "00:00".to_string()
}

impl ResetConfig {
    /// The reset time, falling back to the default when the configured
    /// value is not valid `HH:mm`.
    pub fn reset_time(&self) -> &str {
        if is_valid_hhmm(&self.reset_time) {
            &self.reset_time
        } else {
            "00:00"
        }
    }
}

/// Session tracker configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    /// Seconds of inactivity before a running session is auto-closed
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_secs: i64,

    /// Seconds between inactivity checks in watch mode
    #[serde(default = "default_inactivity_check_interval")]
    pub inactivity_check_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: default_inactivity_timeout(),
            inactivity_check_interval_secs: default_inactivity_check_interval(),
        }
    }
}

fn default_inactivity_timeout() -> i64 {
    3600
}

fn default_inactivity_check_interval() -> u64 {
    300
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/worklog/config.toml` (~/.config/worklog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("worklog").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    ///
    /// `$XDG_DATA_HOME/worklog/` (~/.local/share/worklog/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("worklog")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/worklog/` (~/.local/state/worklog/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("worklog")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/worklog/worklog.db` (~/.local/share/worklog/worklog.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("worklog.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/worklog/worklog.log` (~/.local/state/worklog/worklog.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("worklog.log")
    }
}
