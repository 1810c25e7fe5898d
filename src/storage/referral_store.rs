//! Referral record persistence interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;
use crate::model::{EngagementSnapshot, NewReferral, Referral, ReferralId};

/// Interface for referral record persistence.
///
/// Implementations:
/// - `SqliteReferralStore`: SQLite storage
/// - `MockReferralStore`: in-memory, for tests
#[async_trait]
pub trait ReferralStore: Send + Sync {
    /// Insert a referral unless its (wallet, project) pair already has one.
    ///
    /// Returns the stored record either way: the freshly created row, or the
    /// pre-existing row unchanged. The record id is derived from the pair,
    /// so concurrent calls for the same pair cannot create duplicates.
    async fn insert_if_absent(&self, referral: NewReferral) -> Result<Referral>;

    /// Point lookup by id. `None` when the id is unknown.
    async fn get(&self, id: ReferralId) -> Result<Option<Referral>>;

    /// Lookup by the (affiliate wallet, project) composite key.
    async fn find_by_pair(&self, wallet: &str, project: &str) -> Result<Option<Referral>>;

    /// All referrals carrying a shared post URL, the engagement refresh
    /// scan input.
    async fn list_with_post_urls(&self) -> Result<Vec<Referral>>;

    /// Overwrite the referral-level coarse engagement cache.
    ///
    /// Fails with `ReferralNotFound` when the id is unknown.
    async fn put_engagement(&self, id: ReferralId, snapshot: EngagementSnapshot) -> Result<()>;

    /// Advance the newest-tweet polling cursor.
    ///
    /// Fails with `ReferralNotFound` when the id is unknown.
    async fn put_newest_tweet(
        &self,
        id: ReferralId,
        tweet_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()>;
}
