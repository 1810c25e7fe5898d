//! Pure rollup calculations over raw referral events.
//!
//! Everything here is a deterministic reduction: no I/O, no clocks, no
//! mutation of inputs. Presentation layers call these instead of trusting
//! the denormalized counters on `Referral`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::model::{AggregatedMetrics, ClickEvent, ConversionLogEntry, EngagementCounts, TweetRecord};

/// Reduce a referral's conversion log and click list to its rollup metrics.
///
/// Earnings sum every entry's `amount` regardless of `is_paid`; the figure
/// is gross pipeline value, not settled payout.
pub fn aggregate(conversion_logs: &[ConversionLogEntry], clicks: &[ClickEvent]) -> AggregatedMetrics {
    let mut earnings = Decimal::ZERO;
    let mut last_conversion_at = None;

    for entry in conversion_logs {
        earnings += entry.amount;
        match last_conversion_at {
            Some(latest) if entry.occurred_at <= latest => {}
            _ => last_conversion_at = Some(entry.occurred_at),
        }
    }

    AggregatedMetrics {
        earnings,
        conversions: conversion_logs.len() as u64,
        last_conversion_at,
        clicks: clicks.len() as u64,
    }
}

/// Per-country click totals.
///
/// Clicks whose geolocation never resolved a country land under the empty
/// key; callers decide how to label that bucket.
pub fn click_origin_counts(clicks: &[ClickEvent]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for click in clicks {
        *counts.entry(click.origin.country.clone()).or_insert(0) += 1;
    }
    counts
}

/// Sum of the latest engagement counters across a referral's tweets.
///
/// Tweets never refreshed contribute nothing.
pub fn engagement_totals(tweets: &[TweetRecord]) -> EngagementCounts {
    let mut totals = EngagementCounts::default();
    for tweet in tweets {
        if let Some(snapshot) = &tweet.engagement {
            totals.accumulate(&snapshot.counts);
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::model::{ClickOrigin, EngagementSnapshot, ReferralId};

    fn referral_id() -> ReferralId {
        ReferralId::for_pair("0xabc", "proj")
    }

    fn entry(amount: Decimal, minutes_ago: i64) -> ConversionLogEntry {
        ConversionLogEntry::unpaid(
            referral_id(),
            Utc::now() - Duration::minutes(minutes_ago),
            amount,
            "cp-1",
        )
    }

    fn click(country: &str) -> ClickEvent {
        ClickEvent {
            id: Uuid::new_v4(),
            referral_id: referral_id(),
            occurred_at: Utc::now(),
            ip: "203.0.113.9".to_string(),
            origin: ClickOrigin {
                country: country.to_string(),
                region: String::new(),
                city: String::new(),
            },
            user_agent: None,
        }
    }

    #[test]
    fn test_aggregate_empty_inputs_is_default() {
        let metrics = aggregate(&[], &[]);
        assert_eq!(metrics, AggregatedMetrics::default());
        assert_eq!(metrics.earnings, Decimal::ZERO);
        assert!(metrics.last_conversion_at.is_none());
    }

    #[test]
    fn test_aggregate_sums_exact_decimal_amounts() {
        let entries = vec![
            entry(Decimal::new(10, 0), 30),
            entry(Decimal::new(55, 1), 20),
            entry(Decimal::ZERO, 10),
        ];

        let metrics = aggregate(&entries, &[]);

        assert_eq!(metrics.earnings, Decimal::new(155, 1));
        assert_eq!(metrics.conversions, 3);
    }

    #[test]
    fn test_aggregate_includes_unpaid_entries() {
        let mut paid = entry(Decimal::new(7, 0), 20);
        paid.is_paid = true;
        paid.paid_at = Some(Utc::now());
        let unpaid = entry(Decimal::new(3, 0), 10);

        let metrics = aggregate(&[paid, unpaid], &[]);

        // Gross pipeline value: settlement state does not gate the sum.
        assert_eq!(metrics.earnings, Decimal::new(10, 0));
    }

    #[test]
    fn test_aggregate_last_conversion_is_max_timestamp() {
        let oldest = entry(Decimal::ONE, 90);
        let newest = entry(Decimal::ONE, 5);
        let middle = entry(Decimal::ONE, 40);
        let expected = newest.occurred_at;

        // Input order deliberately not chronological.
        let metrics = aggregate(&[oldest, newest, middle], &[]);

        assert_eq!(metrics.last_conversion_at, Some(expected));
    }

    #[test]
    fn test_aggregate_counts_clicks() {
        let clicks = vec![click("US"), click("DE"), click("US")];
        let metrics = aggregate(&[], &clicks);
        assert_eq!(metrics.clicks, 3);
        assert_eq!(metrics.conversions, 0);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let entries = vec![entry(Decimal::new(42, 1), 15), entry(Decimal::new(8, 0), 5)];
        let clicks = vec![click("US")];

        let first = aggregate(&entries, &clicks);
        let second = aggregate(&entries, &clicks);

        assert_eq!(first, second);
    }

    #[test]
    fn test_click_origin_counts_groups_by_country() {
        let clicks = vec![click("US"), click("DE"), click("US"), click("")];

        let counts = click_origin_counts(&clicks);

        assert_eq!(counts.get("US"), Some(&2));
        assert_eq!(counts.get("DE"), Some(&1));
        assert_eq!(counts.get(""), Some(&1));
    }

    #[test]
    fn test_engagement_totals_skips_unfetched_tweets() {
        let fetched = TweetRecord {
            tweet_id: "1".to_string(),
            referral_id: referral_id(),
            posted_at: Utc::now(),
            engagement: Some(EngagementSnapshot {
                counts: EngagementCounts {
                    retweets: 2,
                    replies: 3,
                    likes: 10,
                    quotes: 1,
                    bookmarks: 4,
                    impressions: 500,
                },
                fetched_at: Utc::now(),
            }),
        };
        let never_fetched = TweetRecord {
            tweet_id: "2".to_string(),
            referral_id: referral_id(),
            posted_at: Utc::now(),
            engagement: None,
        };

        let totals = engagement_totals(&[fetched, never_fetched]);

        assert_eq!(totals.likes, 10);
        assert_eq!(totals.impressions, 500);
        assert_eq!(totals.retweets, 2);
    }
}
