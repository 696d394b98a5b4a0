//! Slack incoming-webhook client
//!
//! Posts a plain-text payload (`{"text": ...}`) to an incoming webhook URL
//! with bounded retries and exponential backoff. Only `hooks.slack.com`
//! URLs are accepted; anything else is a configuration error, caught before
//! the first request.

use std::time::Duration;

use serde_json::json;

use crate::error::{Error, Result};

const WEBHOOK_URL_PREFIX: &str = "https://hooks.slack.com/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Check that `url` is a Slack incoming-webhook URL.
pub fn validate_webhook_url(url: &str) -> Result<()> {
    if url.starts_with(WEBHOOK_URL_PREFIX) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "webhook URL must start with {}",
            WEBHOOK_URL_PREFIX
        )))
    }
}

/// HTTP client bound to one webhook URL.
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Create a client for `url`, validating it first.
    pub fn new(url: &str) -> Result<Self> {
        validate_webhook_url(url)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Webhook(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Post `text` to the webhook.
    ///
    /// Retries up to three attempts with exponential backoff (1s, 2s);
    /// a non-2xx response counts as a failed attempt. Returns
    /// `Error::Webhook` once all attempts are exhausted.
    pub async fn post_text(&self, text: &str) -> Result<()> {
        let payload = json!({ "text": text });
        let mut backoff = INITIAL_BACKOFF;
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.post(&self.url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(attempt, "Webhook post delivered");
                    return Ok(());
                }
                Ok(response) => {
                    last_error = format!("server returned {}", response.status());
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            tracing::warn!(attempt, error = %last_error, "Webhook post attempt failed");
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }

        Err(Error::Webhook(format!(
            "post failed after {} attempts: {}",
            MAX_ATTEMPTS, last_error
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_slack_urls() {
        assert!(validate_webhook_url("https://hooks.slack.com/services/T0/B0/xyz").is_ok());
    }

    #[test]
    fn test_validate_rejects_other_urls() {
        assert!(validate_webhook_url("https://example.com/webhook").is_err());
        assert!(validate_webhook_url("http://hooks.slack.com/services/x").is_err());
        assert!(validate_webhook_url("").is_err());
    }

    #[test]
    fn test_client_rejects_invalid_url() {
        assert!(matches!(
            WebhookClient::new("https://example.com/hook"),
            Err(Error::Config(_))
        ));
    }
}
