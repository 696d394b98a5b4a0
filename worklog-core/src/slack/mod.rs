//! Slack integration: webhook delivery and the daily auto-post schedule.

pub mod autopost;
pub mod webhook;

pub use autopost::AutoPoster;
pub use webhook::{validate_webhook_url, WebhookClient};
