//! Social-engagement records and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::referral::ReferralId;

/// Point-in-time interaction counters for a shared post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub retweets: u64,
    pub replies: u64,
    pub likes: u64,
    pub quotes: u64,
    pub bookmarks: u64,
    pub impressions: u64,
}

impl EngagementCounts {
    /// Add another set of counters into this one, saturating on overflow.
    pub fn accumulate(&mut self, other: &EngagementCounts) {
        self.retweets = self.retweets.saturating_add(other.retweets);
        self.replies = self.replies.saturating_add(other.replies);
        self.likes = self.likes.saturating_add(other.likes);
        self.quotes = self.quotes.saturating_add(other.quotes);
        self.bookmarks = self.bookmarks.saturating_add(other.bookmarks);
        self.impressions = self.impressions.saturating_add(other.impressions);
    }
}

/// Engagement counters plus when they were fetched from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub counts: EngagementCounts,
    pub fetched_at: DateTime<Utc>,
}

/// A tweet the affiliate authored for a referral.
///
/// Carries only the latest engagement counters; each refresh overwrites
/// them rather than appending a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetRecord {
    /// External platform id of the tweet.
    pub tweet_id: String,
    pub referral_id: ReferralId,
    pub posted_at: DateTime<Utc>,
    pub engagement: Option<EngagementSnapshot>,
}

impl TweetRecord {
    /// Latest known impression count, zero when never fetched.
    pub fn impressions(&self) -> u64 {
        self.engagement
            .as_ref()
            .map(|e| e.counts.impressions)
            .unwrap_or(0)
    }
}

/// A video the affiliate published for a referral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// External platform id of the video.
    pub video_id: String,
    pub referral_id: ReferralId,
    pub published_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    /// When the view counters were last refreshed.
    pub fetched_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_sums_all_counters() {
        let mut total = EngagementCounts {
            retweets: 1,
            replies: 2,
            likes: 3,
            quotes: 4,
            bookmarks: 5,
            impressions: 6,
        };
        total.accumulate(&EngagementCounts {
            retweets: 10,
            replies: 20,
            likes: 30,
            quotes: 40,
            bookmarks: 50,
            impressions: 60,
        });

        assert_eq!(total.retweets, 11);
        assert_eq!(total.replies, 22);
        assert_eq!(total.likes, 33);
        assert_eq!(total.quotes, 44);
        assert_eq!(total.bookmarks, 55);
        assert_eq!(total.impressions, 66);
    }

    #[test]
    fn test_tweet_impressions_defaults_to_zero() {
        let tweet = TweetRecord {
            tweet_id: "1".to_string(),
            referral_id: ReferralId::for_pair("0xabc", "p"),
            posted_at: Utc::now(),
            engagement: None,
        };
        assert_eq!(tweet.impressions(), 0);
    }
}
