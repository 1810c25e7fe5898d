//! End-to-end aggregation and scoring over the in-memory stores.

mod common;

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use common::{click, conversion, tweet, video};
use reftally::adapter::EventStoreAdapter;
use reftally::lifecycle::ReferralManager;
use reftally::model::{ImpressionTier, ReferralId, XpPointsConfig};
use reftally::rollup;
use reftally::services::{MetricsService, ProjectXp, XpService};
use reftally::storage::mock::{MockEventStore, MockReferralStore, MockXpConfigStore};
use reftally::storage::{ReferralEventStore, ReferralStore, StorageError, XpConfigStore};

struct World {
    referrals: Arc<MockReferralStore>,
    events: Arc<MockEventStore>,
    configs: Arc<MockXpConfigStore>,
}

fn world() -> World {
    World {
        referrals: Arc::new(MockReferralStore::new()),
        events: Arc::new(MockEventStore::new()),
        configs: Arc::new(MockXpConfigStore::new()),
    }
}

async fn enroll(world: &World, wallet: &str, project: &str) -> ReferralId {
    ReferralManager::new(world.referrals.clone())
        .get_or_create(wallet, project)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_metrics_recomputed_from_raw_events() {
    let w = world();
    let id = enroll(&w, "0xaaa", "proj-a").await;

    w.events
        .append_conversion(conversion(id, "10.5", 60))
        .await
        .unwrap();
    let newest = conversion(id, "5", 1);
    let newest_at = newest.occurred_at;
    w.events.append_conversion(newest).await.unwrap();
    w.events.append_click(click(id, "US")).await.unwrap();
    w.events.append_click(click(id, "DE")).await.unwrap();

    let service = MetricsService::new(w.referrals.clone(), w.events.clone());
    let metrics = service.aggregate_for(id).await.unwrap();

    assert_eq!(metrics.earnings, "15.5".parse::<Decimal>().unwrap());
    assert_eq!(metrics.conversions, 2);
    assert_eq!(metrics.clicks, 2);
    assert_eq!(metrics.last_conversion_at, Some(newest_at));

    // Rollups never write back; the stored legacy counters stay zeroed.
    let stored = w.referrals.get(id).await.unwrap().unwrap();
    assert_eq!(stored.conversions, 0);
    assert_eq!(stored.earnings, Decimal::ZERO);
}

#[tokio::test]
async fn test_settlement_leaves_earnings_unchanged() {
    let w = world();
    let id = enroll(&w, "0xaaa", "proj-a").await;

    let entry = conversion(id, "7.25", 30);
    let entry_id = entry.id;
    w.events.append_conversion(entry).await.unwrap();
    w.events
        .append_conversion(conversion(id, "2.75", 10))
        .await
        .unwrap();

    let service = MetricsService::new(w.referrals.clone(), w.events.clone());
    let before = service.aggregate_for(id).await.unwrap();

    w.events
        .mark_conversion_paid(entry_id, Utc::now(), "0xfeedbeef")
        .await
        .unwrap();

    let after = service.aggregate_for(id).await.unwrap();
    assert_eq!(after.earnings, before.earnings);
    assert_eq!(after.conversions, before.conversions);

    let logs = w.events.conversion_logs(id).await.unwrap();
    let settled = logs.iter().find(|l| l.id == entry_id).unwrap();
    assert!(settled.is_paid);
    assert_eq!(settled.transaction_hash.as_deref(), Some("0xfeedbeef"));
}

#[tokio::test]
async fn test_adapter_view_collects_every_event_kind() {
    let w = world();
    let id = enroll(&w, "0xbbb", "proj-a").await;

    w.events.append_click(click(id, "US")).await.unwrap();
    w.events
        .append_conversion(conversion(id, "1", 5))
        .await
        .unwrap();
    w.events
        .append_tweet(tweet(id, "9001", Some(250)))
        .await
        .unwrap();
    w.events.append_tweet(tweet(id, "9002", None)).await.unwrap();
    w.events
        .append_video(video(id, "vid-1", 1200))
        .await
        .unwrap();

    let adapter = EventStoreAdapter::new(w.referrals.clone(), w.events.clone());
    let view = adapter.events_for(id).await.unwrap();

    assert_eq!(view.referral.id, id);
    assert_eq!(view.clicks.len(), 1);
    assert_eq!(view.conversion_logs.len(), 1);
    assert_eq!(view.tweets.len(), 2);
    assert_eq!(view.videos.len(), 1);
    assert_eq!(view.videos[0].views, 1200);

    let totals = rollup::engagement_totals(&view.tweets);
    assert_eq!(totals.impressions, 250);
}

#[tokio::test]
async fn test_click_origins_grouped_by_country() {
    let w = world();
    let id = enroll(&w, "0xccc", "proj-a").await;

    for country in ["US", "US", "US", "DE", ""] {
        w.events.append_click(click(id, country)).await.unwrap();
    }

    let clicks = w.events.clicks(id).await.unwrap();
    let counts = rollup::click_origin_counts(&clicks);

    assert_eq!(counts.get("US"), Some(&3));
    assert_eq!(counts.get("DE"), Some(&1));
    assert_eq!(counts.get(""), Some(&1));
}

#[tokio::test]
async fn test_batch_aggregation_isolates_missing_referral() {
    let w = world();
    let known = enroll(&w, "0xddd", "proj-a").await;
    w.events
        .append_conversion(conversion(known, "3", 2))
        .await
        .unwrap();
    let unknown = ReferralId::for_pair("0xnobody", "proj-a");

    let service = MetricsService::new(w.referrals.clone(), w.events.clone());
    let batch = service.aggregate_many(&[known, unknown]).await;

    assert_eq!(batch.metrics.len(), 1);
    assert_eq!(batch.metrics[0].0, known);
    assert_eq!(batch.failures.len(), 1);
    assert!(matches!(
        batch.failures[0].1,
        StorageError::ReferralNotFound { referral } if referral == unknown
    ));
}

#[tokio::test]
async fn test_wallet_xp_spans_projects() {
    let w = world();
    let id = enroll(&w, "0xeee", "proj-a").await;
    enroll(&w, "0xeee", "proj-b").await;

    w.configs
        .put(
            "proj-a",
            XpPointsConfig {
                x_post: 5,
                click: 2,
                imp_tiers: vec![
                    ImpressionTier {
                        threshold: 100,
                        points: 10,
                    },
                    ImpressionTier {
                        threshold: 1000,
                        points: 50,
                    },
                ],
            },
        )
        .await
        .unwrap();

    w.events
        .append_tweet(tweet(id, "t-1", Some(150)))
        .await
        .unwrap();
    w.events.append_tweet(tweet(id, "t-2", None)).await.unwrap();
    for _ in 0..3 {
        w.events.append_click(click(id, "US")).await.unwrap();
    }

    let service = XpService::new(w.referrals.clone(), w.events.clone(), w.configs.clone());
    let breakdown = service
        .total_for_wallet("0xeee", &["proj-a".to_string(), "proj-b".to_string()])
        .await
        .unwrap();

    // Two posts, one qualifying the 100-impression tier, three clicks.
    assert_eq!(breakdown.total, 26);
    assert_eq!(
        breakdown.projects,
        vec![
            ProjectXp {
                project_id: "proj-a".to_string(),
                points: 26,
            },
            ProjectXp {
                project_id: "proj-b".to_string(),
                points: 0,
            },
        ]
    );
}

#[tokio::test]
async fn test_enrollment_is_idempotent_end_to_end() {
    let w = world();
    let manager = ReferralManager::new(w.referrals.clone());

    let first = manager.get_or_create("0xfff", "proj-a").await.unwrap();
    let second = manager.get_or_create("0xfff", "proj-a").await.unwrap();
    let found = manager.find("0xfff", "proj-a").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(found.id, first.id);
    assert_eq!(w.referrals.stored_count().await, 1);
}
