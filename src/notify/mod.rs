//! Run-outcome notification sinks.
//!
//! The refresh job reports its summary (or failure) through this contract.
//! Delivery is best-effort; callers log notifier errors and keep going.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Errors that can occur when delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("webhook rejected notification: HTTP {status} - {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Notification destination for job outcomes.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one plain-text message.
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// No-op notifier for tests or when no webhook is configured.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        debug!(len = text.len(), "notification discarded (null notifier)");
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Slack-style incoming-webhook notifier.
///
/// POSTs `{"text": ...}` to the configured URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let url = url.into();
        if url.is_empty() {
            return Err(NotifyError::Config(
                "webhook URL not configured".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %self.url, "notification delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status,
                body: body.chars().take(200).collect(),
            })
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
