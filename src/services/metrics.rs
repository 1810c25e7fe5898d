//! Per-referral metrics aggregation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use crate::adapter::EventStoreAdapter;
use crate::model::{AggregatedMetrics, ReferralId};
use crate::rollup;
use crate::storage::{ReferralEventStore, ReferralStore, Result, StorageError};

/// Outcome of a batch aggregation.
///
/// Failed referrals never abort the rest; they are collected here alongside
/// the successful metrics. No ordering guarantee on either list.
#[derive(Debug)]
pub struct BatchMetrics {
    pub metrics: Vec<(ReferralId, AggregatedMetrics)>,
    pub failures: Vec<(ReferralId, StorageError)>,
}

/// Computes rollup metrics for referrals by fetching their raw events and
/// reducing them, never by reading the denormalized counters.
pub struct MetricsService {
    adapter: EventStoreAdapter,
}

impl MetricsService {
    pub fn new(referrals: Arc<dyn ReferralStore>, events: Arc<dyn ReferralEventStore>) -> Self {
        Self {
            adapter: EventStoreAdapter::new(referrals, events),
        }
    }

    /// Recompute one referral's metrics from its raw events.
    pub async fn aggregate_for(&self, referral: ReferralId) -> Result<AggregatedMetrics> {
        let view = self.adapter.events_for(referral).await?;
        Ok(rollup::aggregate(&view.conversion_logs, &view.clicks))
    }

    /// Recompute metrics for a whole list of referrals concurrently.
    pub async fn aggregate_many(&self, referrals: &[ReferralId]) -> BatchMetrics {
        let results = join_all(
            referrals
                .iter()
                .map(|id| async move { (*id, self.aggregate_for(*id).await) }),
        )
        .await;

        let mut metrics = Vec::new();
        let mut failures = Vec::new();
        for (id, result) in results {
            match result {
                Ok(aggregated) => metrics.push((id, aggregated)),
                Err(e) => {
                    warn!(referral = %id, error = %e, "aggregation failed, continuing batch");
                    failures.push((id, e));
                }
            }
        }

        BatchMetrics { metrics, failures }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::model::{ClickEvent, ConversionLogEntry, NewReferral};
    use crate::storage::mock::{MockEventStore, MockReferralStore};

    struct Fixture {
        referrals: Arc<MockReferralStore>,
        events: Arc<MockEventStore>,
        service: MetricsService,
    }

    fn fixture() -> Fixture {
        let referrals = Arc::new(MockReferralStore::new());
        let events = Arc::new(MockEventStore::new());
        let service = MetricsService::new(referrals.clone(), events.clone());
        Fixture {
            referrals,
            events,
            service,
        }
    }

    async fn seed_referral(fx: &Fixture, wallet: &str, amounts: &[Decimal], clicks: usize) -> ReferralId {
        let referral = fx
            .referrals
            .insert_if_absent(NewReferral::now(wallet, "proj"))
            .await
            .unwrap();
        for amount in amounts {
            fx.events
                .append_conversion(ConversionLogEntry::unpaid(
                    referral.id,
                    Utc::now(),
                    *amount,
                    "cp-1",
                ))
                .await
                .unwrap();
        }
        for _ in 0..clicks {
            fx.events
                .append_click(ClickEvent {
                    id: Uuid::new_v4(),
                    referral_id: referral.id,
                    occurred_at: Utc::now(),
                    ip: "203.0.113.9".to_string(),
                    origin: Default::default(),
                    user_agent: None,
                })
                .await
                .unwrap();
        }
        referral.id
    }

    #[tokio::test]
    async fn test_aggregate_for_reduces_raw_events() {
        let fx = fixture();
        let id = seed_referral(&fx, "0xabc", &[Decimal::new(10, 0), Decimal::new(55, 1)], 2).await;

        let metrics = fx.service.aggregate_for(id).await.unwrap();

        assert_eq!(metrics.earnings, Decimal::new(155, 1));
        assert_eq!(metrics.conversions, 2);
        assert_eq!(metrics.clicks, 2);
        assert!(metrics.last_conversion_at.is_some());
    }

    #[tokio::test]
    async fn test_aggregate_for_unknown_referral_is_not_found() {
        let fx = fixture();
        let result = fx.service.aggregate_for(ReferralId::for_pair("0x0", "p")).await;
        assert!(matches!(result, Err(StorageError::ReferralNotFound { .. })));
    }

    #[tokio::test]
    async fn test_aggregate_many_collects_partial_failures() {
        let fx = fixture();
        let known_a = seed_referral(&fx, "0xaaa", &[Decimal::ONE], 0).await;
        let known_b = seed_referral(&fx, "0xbbb", &[], 1).await;
        let unknown = ReferralId::for_pair("0xccc", "proj");

        let batch = fx
            .service
            .aggregate_many(&[known_a, unknown, known_b])
            .await;

        assert_eq!(batch.metrics.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].0, unknown);
    }

    #[tokio::test]
    async fn test_aggregate_many_empty_input() {
        let fx = fixture();
        let batch = fx.service.aggregate_many(&[]).await;
        assert!(batch.metrics.is_empty());
        assert!(batch.failures.is_empty());
    }
}
