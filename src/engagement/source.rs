//! Engagement metrics source.
//!
//! Fetches latest interaction counters for batches of external post ids
//! from the social platform's metrics endpoint.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::model::EngagementCounts;

/// Errors that can occur when fetching engagement metrics.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decode error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Endpoint is temporarily unavailable (rate limit, 5xx).
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Latest counters for one external post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEngagement {
    pub post_id: String,
    pub counts: EngagementCounts,
}

/// Source of engagement counters for external post ids.
///
/// One call covers at most one batch; chunking a long id list is the
/// caller's job. Posts the platform no longer knows are simply absent from
/// the result, not errors.
#[async_trait]
pub trait EngagementSource: Send + Sync {
    /// Fetch latest counters for up to one batch of post ids.
    async fn fetch_batch(&self, post_ids: &[String]) -> Result<Vec<PostEngagement>, SourceError>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// HTTP source configuration.
#[derive(Debug, Clone)]
pub struct EngagementSourceConfig {
    /// Metrics endpoint URL.
    pub endpoint: String,

    /// Bearer token for the platform API. Environment-supplied; never read
    /// from a config file.
    pub bearer_token: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum ids per request.
    pub batch_size: usize,
}

impl Default for EngagementSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bearer_token: String::new(),
            timeout: Duration::from_secs(30),
            batch_size: 100,
        }
    }
}

impl EngagementSourceConfig {
    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the bearer token.
    pub fn with_bearer_token(mut self, token: String) -> Self {
        self.bearer_token = token;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-request id limit.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// HTTP implementation of the engagement source.
///
/// Queries a Twitter-v2-style endpoint (`?ids=...&tweet.fields=
/// public_metrics`) with bearer auth and retries transient failures with
/// exponential backoff.
pub struct HttpEngagementSource {
    client: Client,
    config: EngagementSourceConfig,
}

impl HttpEngagementSource {
    /// Create a new HTTP source with the given configuration.
    pub fn new(config: EngagementSourceConfig) -> Result<Self, SourceError> {
        if config.endpoint.is_empty() {
            return Err(SourceError::Config(
                "engagement endpoint not configured".to_string(),
            ));
        }
        if config.bearer_token.is_empty() {
            return Err(SourceError::Config(
                "engagement bearer token not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SourceError::Http)?;

        Ok(Self { client, config })
    }

    /// Backoff configuration for retries.
    fn backoff() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(5)
            .with_jitter()
    }

    /// Determine if an HTTP error is retryable.
    fn is_retryable(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    /// Determine if an HTTP status code is retryable.
    fn is_retryable_status(status: reqwest::StatusCode) -> bool {
        status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// One GET against the metrics endpoint, no retry.
    async fn get_batch(&self, post_ids: &[String]) -> Result<Vec<PostEngagement>, SourceError> {
        let ids = post_ids.join(",");

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("ids", ids.as_str()), ("tweet.fields", "public_metrics")])
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(200).collect();

            if Self::is_retryable_status(status) {
                warn!(
                    endpoint = %self.config.endpoint,
                    status = %status,
                    body = %truncated,
                    "metrics endpoint returned retryable status"
                );
                return Err(SourceError::Unavailable(format!(
                    "HTTP {} - {}",
                    status, truncated
                )));
            }
            error!(
                endpoint = %self.config.endpoint,
                status = %status,
                body = %truncated,
                "metrics request failed"
            );
            return Err(SourceError::Config(format!(
                "HTTP {} - {}",
                status, truncated
            )));
        }

        let payload: BatchResponse = response.json().await?;

        debug!(
            requested = post_ids.len(),
            returned = payload.data.len(),
            "engagement batch fetched"
        );

        Ok(payload
            .data
            .into_iter()
            .map(|tweet| PostEngagement {
                post_id: tweet.id,
                counts: tweet.public_metrics.into(),
            })
            .collect())
    }
}

#[async_trait]
impl EngagementSource for HttpEngagementSource {
    async fn fetch_batch(&self, post_ids: &[String]) -> Result<Vec<PostEngagement>, SourceError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        if post_ids.len() > self.config.batch_size {
            return Err(SourceError::Config(format!(
                "batch of {} ids exceeds limit {}",
                post_ids.len(),
                self.config.batch_size
            )));
        }

        // Retry with backoff on transient failures
        (|| async { self.get_batch(post_ids).await })
            .retry(Self::backoff())
            .when(|e| {
                matches!(
                    e,
                    SourceError::Http(err) if Self::is_retryable(err)
                ) || matches!(e, SourceError::Unavailable(_))
            })
            .await
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    data: Vec<TweetPayload>,
}

#[derive(Debug, Deserialize)]
struct TweetPayload {
    id: String,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    quote_count: u64,
    #[serde(default)]
    bookmark_count: u64,
    #[serde(default)]
    impression_count: u64,
}

impl From<PublicMetrics> for EngagementCounts {
    fn from(metrics: PublicMetrics) -> Self {
        Self {
            retweets: metrics.retweet_count,
            replies: metrics.reply_count,
            likes: metrics.like_count,
            quotes: metrics.quote_count,
            bookmarks: metrics.bookmark_count,
            impressions: metrics.impression_count,
        }
    }
}
