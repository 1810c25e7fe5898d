//! Shared event builders for integration tests.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use reftally::model::{
    ClickEvent, ClickOrigin, ConversionLogEntry, EngagementCounts, EngagementSnapshot, ReferralId,
    TweetRecord, VideoRecord,
};

/// A click from `country`, recorded now.
pub fn click(referral: ReferralId, country: &str) -> ClickEvent {
    ClickEvent {
        id: Uuid::new_v4(),
        referral_id: referral,
        occurred_at: Utc::now(),
        ip: "203.0.113.9".to_string(),
        origin: ClickOrigin {
            country: country.to_string(),
            region: String::new(),
            city: String::new(),
        },
        user_agent: Some("integration-test".to_string()),
    }
}

/// An unpaid conversion worth `amount`, recorded `minutes_ago`.
pub fn conversion(referral: ReferralId, amount: &str, minutes_ago: i64) -> ConversionLogEntry {
    ConversionLogEntry::unpaid(
        referral,
        Utc::now() - Duration::minutes(minutes_ago),
        amount.parse::<Decimal>().expect("valid decimal literal"),
        "cp-signup",
    )
}

/// A tweet, with engagement counters when `impressions` is given.
pub fn tweet(referral: ReferralId, tweet_id: &str, impressions: Option<u64>) -> TweetRecord {
    TweetRecord {
        tweet_id: tweet_id.to_string(),
        referral_id: referral,
        posted_at: Utc::now(),
        engagement: impressions.map(|impressions| EngagementSnapshot {
            counts: EngagementCounts {
                impressions,
                ..Default::default()
            },
            fetched_at: Utc::now(),
        }),
    }
}

/// A published video with derived like/comment counters.
pub fn video(referral: ReferralId, video_id: &str, views: u64) -> VideoRecord {
    VideoRecord {
        video_id: video_id.to_string(),
        referral_id: referral,
        published_at: Utc::now(),
        views,
        likes: views / 10,
        comments: views / 100,
        fetched_at: Some(Utc::now()),
    }
}
