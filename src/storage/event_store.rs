//! Per-referral event sub-collection interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Result;
use crate::model::{
    ClickEvent, ConversionLogEntry, EngagementSnapshot, ReferralId, TweetRecord, VideoRecord,
};

/// Interface for the typed event sub-collections hanging off each referral.
///
/// Reads return rows in insertion order; callers that care about time must
/// order by the explicit event timestamps. An empty sub-collection is an
/// empty vec, not an error. The ingest writes exist for the platform's
/// event-recording paths and for tests; the aggregation core itself only
/// reads.
#[async_trait]
pub trait ReferralEventStore: Send + Sync {
    /// All clicks recorded for a referral.
    async fn clicks(&self, referral: ReferralId) -> Result<Vec<ClickEvent>>;

    /// All conversion log entries recorded for a referral.
    async fn conversion_logs(&self, referral: ReferralId) -> Result<Vec<ConversionLogEntry>>;

    /// All tweets recorded for a referral.
    async fn tweets(&self, referral: ReferralId) -> Result<Vec<TweetRecord>>;

    /// All videos recorded for a referral.
    async fn videos(&self, referral: ReferralId) -> Result<Vec<VideoRecord>>;

    /// Record a click. Clicks are immutable once written.
    async fn append_click(&self, click: ClickEvent) -> Result<()>;

    /// Record a conversion log entry.
    async fn append_conversion(&self, entry: ConversionLogEntry) -> Result<()>;

    /// Record a tweet authored for a referral.
    async fn append_tweet(&self, tweet: TweetRecord) -> Result<()>;

    /// Record a published video.
    async fn append_video(&self, video: VideoRecord) -> Result<()>;

    /// Overwrite a tweet's latest engagement counters.
    ///
    /// Fails with `TweetNotFound` when the tweet id is unknown.
    async fn put_tweet_engagement(
        &self,
        tweet_id: &str,
        snapshot: EngagementSnapshot,
    ) -> Result<()>;

    /// Settle a conversion: flip `is_paid` and record when and under which
    /// transaction. The only legal post-creation mutation of an entry.
    ///
    /// Fails with `ConversionNotFound` when the entry id is unknown.
    async fn mark_conversion_paid(
        &self,
        conversion: Uuid,
        paid_at: DateTime<Utc>,
        transaction_hash: &str,
    ) -> Result<()>;
}
