//! Mock storage implementations for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ReferralEventStore, ReferralStore, Result, StorageError, XpConfigStore};
use crate::model::{
    ClickEvent, ConversionLogEntry, EngagementSnapshot, NewReferral, Referral, ReferralId,
    TweetRecord, VideoRecord, XpPointsConfig,
};

/// Mock referral store that keeps records in memory.
#[derive(Default)]
pub struct MockReferralStore {
    referrals: RwLock<HashMap<ReferralId, Referral>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
}

impl MockReferralStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    /// Number of stored referrals.
    pub async fn stored_count(&self) -> usize {
        self.referrals.read().await.len()
    }
}

#[async_trait]
impl ReferralStore for MockReferralStore {
    async fn insert_if_absent(&self, referral: NewReferral) -> Result<Referral> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        let id = referral.id();
        let mut store = self.referrals.write().await;
        if let Some(existing) = store.get(&id) {
            return Ok(existing.clone());
        }
        let record = referral.into_referral();
        store.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: ReferralId) -> Result<Option<Referral>> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(self.referrals.read().await.get(&id).cloned())
    }

    async fn find_by_pair(&self, wallet: &str, project: &str) -> Result<Option<Referral>> {
        self.get(ReferralId::for_pair(wallet, project)).await
    }

    async fn list_with_post_urls(&self) -> Result<Vec<Referral>> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        let store = self.referrals.read().await;
        let mut listed: Vec<Referral> = store
            .values()
            .filter(|r| r.shared_post_url.is_some())
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep scans reproducible.
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listed)
    }

    async fn put_engagement(&self, id: ReferralId, snapshot: EngagementSnapshot) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        let mut store = self.referrals.write().await;
        match store.get_mut(&id) {
            Some(referral) => {
                referral.engagement = Some(snapshot);
                Ok(())
            }
            None => Err(StorageError::ReferralNotFound { referral: id }),
        }
    }

    async fn put_newest_tweet(
        &self,
        id: ReferralId,
        tweet_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        let mut store = self.referrals.write().await;
        match store.get_mut(&id) {
            Some(referral) => {
                referral.tweet_newest_id = Some(tweet_id.to_string());
                referral.tweet_newest_created_at = Some(created_at);
                Ok(())
            }
            None => Err(StorageError::ReferralNotFound { referral: id }),
        }
    }
}

/// Mock event store that keeps per-referral event lists in memory.
#[derive(Default)]
pub struct MockEventStore {
    clicks: RwLock<HashMap<ReferralId, Vec<ClickEvent>>>,
    conversions: RwLock<HashMap<ReferralId, Vec<ConversionLogEntry>>>,
    tweets: RwLock<HashMap<ReferralId, Vec<TweetRecord>>>,
    videos: RwLock<HashMap<ReferralId, Vec<VideoRecord>>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
}

impl MockEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    async fn check_write(&self) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReferralEventStore for MockEventStore {
    async fn clicks(&self, referral: ReferralId) -> Result<Vec<ClickEvent>> {
        self.check_read().await?;
        let store = self.clicks.read().await;
        Ok(store.get(&referral).cloned().unwrap_or_default())
    }

    async fn conversion_logs(&self, referral: ReferralId) -> Result<Vec<ConversionLogEntry>> {
        self.check_read().await?;
        let store = self.conversions.read().await;
        Ok(store.get(&referral).cloned().unwrap_or_default())
    }

    async fn tweets(&self, referral: ReferralId) -> Result<Vec<TweetRecord>> {
        self.check_read().await?;
        let store = self.tweets.read().await;
        Ok(store.get(&referral).cloned().unwrap_or_default())
    }

    async fn videos(&self, referral: ReferralId) -> Result<Vec<VideoRecord>> {
        self.check_read().await?;
        let store = self.videos.read().await;
        Ok(store.get(&referral).cloned().unwrap_or_default())
    }

    async fn append_click(&self, click: ClickEvent) -> Result<()> {
        self.check_write().await?;
        let mut store = self.clicks.write().await;
        store.entry(click.referral_id).or_default().push(click);
        Ok(())
    }

    async fn append_conversion(&self, entry: ConversionLogEntry) -> Result<()> {
        self.check_write().await?;
        let mut store = self.conversions.write().await;
        store.entry(entry.referral_id).or_default().push(entry);
        Ok(())
    }

    async fn append_tweet(&self, tweet: TweetRecord) -> Result<()> {
        self.check_write().await?;
        let mut store = self.tweets.write().await;
        store.entry(tweet.referral_id).or_default().push(tweet);
        Ok(())
    }

    async fn append_video(&self, video: VideoRecord) -> Result<()> {
        self.check_write().await?;
        let mut store = self.videos.write().await;
        store.entry(video.referral_id).or_default().push(video);
        Ok(())
    }

    async fn put_tweet_engagement(
        &self,
        tweet_id: &str,
        snapshot: EngagementSnapshot,
    ) -> Result<()> {
        self.check_write().await?;
        let mut store = self.tweets.write().await;
        for tweets in store.values_mut() {
            if let Some(tweet) = tweets.iter_mut().find(|t| t.tweet_id == tweet_id) {
                tweet.engagement = Some(snapshot);
                return Ok(());
            }
        }
        Err(StorageError::TweetNotFound {
            tweet_id: tweet_id.to_string(),
        })
    }

    async fn mark_conversion_paid(
        &self,
        conversion: Uuid,
        paid_at: DateTime<Utc>,
        transaction_hash: &str,
    ) -> Result<()> {
        self.check_write().await?;
        let mut store = self.conversions.write().await;
        for entries in store.values_mut() {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == conversion) {
                entry.is_paid = true;
                entry.paid_at = Some(paid_at);
                entry.transaction_hash = Some(transaction_hash.to_string());
                return Ok(());
            }
        }
        Err(StorageError::ConversionNotFound { conversion })
    }
}

/// Mock XP config store that keeps per-project rules in memory.
#[derive(Default)]
pub struct MockXpConfigStore {
    configs: RwLock<HashMap<String, XpPointsConfig>>,
    fail_on_read: RwLock<bool>,
}

impl MockXpConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }
}

#[async_trait]
impl XpConfigStore for MockXpConfigStore {
    async fn get(&self, project_id: &str) -> Result<Option<XpPointsConfig>> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(self.configs.read().await.get(project_id).cloned())
    }

    async fn put(&self, project_id: &str, config: XpPointsConfig) -> Result<()> {
        self.configs
            .write()
            .await
            .insert(project_id.to_string(), config);
        Ok(())
    }
}
