//! Daily auto-post scheduling
//!
//! The watch loop ticks once a minute and asks [`AutoPoster::due`] whether
//! the scheduled post should fire. A post is due when auto-posting is
//! enabled with a webhook URL configured, the local wall clock reads
//! exactly the configured `HH:mm`, and nothing has been posted yet today.
//! The once-per-day guard lives in memory; a process restart after the
//! scheduled minute simply misses that day's post.

use chrono::{DateTime, Local};

use crate::config::SlackConfig;

/// Tracks the once-per-day guard for the scheduled post.
#[derive(Debug, Default)]
pub struct AutoPoster {
    last_posted: Option<String>,
}

impl AutoPoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the scheduled post should fire at `now`.
    pub fn due(&self, slack: &SlackConfig, now: DateTime<Local>) -> bool {
        if !slack.auto_post_enabled || slack.webhook_url.is_none() {
            return false;
        }

        let today = now.format("%Y-%m-%d").to_string();
        if self.last_posted.as_deref() == Some(today.as_str()) {
            return false;
        }

        now.format("%H:%M").to_string() == slack.auto_post_time()
    }

    /// Record that `date` has been posted, arming the guard until the next
    /// calendar day.
    pub fn mark_posted(&mut self, date: &str) {
        self.last_posted = Some(date.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slack_at(time: &str) -> SlackConfig {
        SlackConfig {
            webhook_url: Some("https://hooks.slack.com/services/T0/B0/xyz".to_string()),
            auto_post_enabled: true,
            auto_post_time: time.to_string(),
            ..Default::default()
        }
    }

    fn local(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn test_due_at_configured_minute() {
        let poster = AutoPoster::new();
        let slack = slack_at("18:00");
        assert!(poster.due(&slack, local(18, 0, 0)));
        assert!(poster.due(&slack, local(18, 0, 59)));
        assert!(!poster.due(&slack, local(17, 59, 59)));
        assert!(!poster.due(&slack, local(18, 1, 0)));
    }

    #[test]
    fn test_not_due_when_disabled_or_unconfigured() {
        let poster = AutoPoster::new();

        let mut disabled = slack_at("18:00");
        disabled.auto_post_enabled = false;
        assert!(!poster.due(&disabled, local(18, 0, 0)));

        let mut no_url = slack_at("18:00");
        no_url.webhook_url = None;
        assert!(!poster.due(&no_url, local(18, 0, 0)));
    }

    #[test]
    fn test_posts_at_most_once_per_day() {
        let mut poster = AutoPoster::new();
        let slack = slack_at("18:00");

        assert!(poster.due(&slack, local(18, 0, 0)));
        poster.mark_posted("2026-03-10");
        assert!(!poster.due(&slack, local(18, 0, 30)));

        // the guard resets on the next calendar day
        let next_day = Local.with_ymd_and_hms(2026, 3, 11, 18, 0, 0).unwrap();
        assert!(poster.due(&slack, next_day));
    }

    #[test]
    fn test_invalid_time_falls_back_to_default() {
        let poster = AutoPoster::new();
        let slack = slack_at("25:99");
        assert!(poster.due(&slack, local(18, 0, 0)));
    }
}
