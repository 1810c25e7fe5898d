//! Read-only per-referral event view.

use std::sync::Arc;

use crate::model::{
    ClickEvent, ConversionLogEntry, Referral, ReferralId, TweetRecord, VideoRecord,
};
use crate::storage::{ReferralEventStore, ReferralStore, Result, StorageError};

/// A referral together with all of its raw event sub-collections.
#[derive(Debug, Clone)]
pub struct ReferralEvents {
    pub referral: Referral,
    pub clicks: Vec<ClickEvent>,
    pub conversion_logs: Vec<ConversionLogEntry>,
    pub tweets: Vec<TweetRecord>,
    pub videos: Vec<VideoRecord>,
}

/// Assembles a referral with its typed event sequences.
///
/// Read-only: ingest and cache writes go through the store traits directly.
pub struct EventStoreAdapter {
    referrals: Arc<dyn ReferralStore>,
    events: Arc<dyn ReferralEventStore>,
}

impl EventStoreAdapter {
    pub fn new(referrals: Arc<dyn ReferralStore>, events: Arc<dyn ReferralEventStore>) -> Self {
        Self { referrals, events }
    }

    /// Fetch the referral and all four event sequences concurrently.
    ///
    /// Fails with `ReferralNotFound` when the id is unknown. A referral
    /// without events is a valid result with empty sequences.
    pub async fn events_for(&self, id: ReferralId) -> Result<ReferralEvents> {
        let referral = self
            .referrals
            .get(id)
            .await?
            .ok_or(StorageError::ReferralNotFound { referral: id })?;

        let (clicks, conversion_logs, tweets, videos) = tokio::try_join!(
            self.events.clicks(id),
            self.events.conversion_logs(id),
            self.events.tweets(id),
            self.events.videos(id),
        )?;

        Ok(ReferralEvents {
            referral,
            clicks,
            conversion_logs,
            tweets,
            videos,
        })
    }
}
