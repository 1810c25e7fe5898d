//! Cross-project XP totals for a wallet.

use std::sync::Arc;

use tracing::warn;

use crate::scoring;
use crate::storage::{ReferralEventStore, ReferralStore, Result, XpConfigStore};

/// XP earned by one wallet in one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectXp {
    pub project_id: String,
    pub points: u64,
}

/// A wallet's XP total with its per-project breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpBreakdown {
    pub total: u64,
    pub projects: Vec<ProjectXp>,
}

/// Scores a wallet across its joined projects.
///
/// A project with no stored point rules, or one the wallet never joined,
/// contributes a zero-point entry with a warning instead of failing the
/// whole computation. Store failures still propagate.
pub struct XpService {
    referrals: Arc<dyn ReferralStore>,
    events: Arc<dyn ReferralEventStore>,
    configs: Arc<dyn XpConfigStore>,
}

impl XpService {
    pub fn new(
        referrals: Arc<dyn ReferralStore>,
        events: Arc<dyn ReferralEventStore>,
        configs: Arc<dyn XpConfigStore>,
    ) -> Self {
        Self {
            referrals,
            events,
            configs,
        }
    }

    /// Total XP for `wallet` across `projects`, with per-project detail.
    pub async fn total_for_wallet(&self, wallet: &str, projects: &[String]) -> Result<XpBreakdown> {
        let mut breakdown = XpBreakdown {
            total: 0,
            projects: Vec::with_capacity(projects.len()),
        };

        for project in projects {
            let points = self.project_points(wallet, project).await?;
            breakdown.total = breakdown.total.saturating_add(points);
            breakdown.projects.push(ProjectXp {
                project_id: project.clone(),
                points,
            });
        }

        Ok(breakdown)
    }

    async fn project_points(&self, wallet: &str, project: &str) -> Result<u64> {
        let Some(config) = self.configs.get(project).await? else {
            warn!(project, "no XP point rules configured, scoring zero");
            return Ok(0);
        };

        let Some(referral) = self.referrals.find_by_pair(wallet, project).await? else {
            warn!(wallet, project, "wallet has no referral in project, scoring zero");
            return Ok(0);
        };

        let (tweets, clicks) = tokio::try_join!(
            self.events.tweets(referral.id),
            self.events.clicks(referral.id),
        )?;

        Ok(scoring::project_xp(&config, &tweets, &clicks))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::model::{ClickEvent, ImpressionTier, NewReferral, TweetRecord, XpPointsConfig};
    use crate::storage::mock::{MockEventStore, MockReferralStore, MockXpConfigStore};
    use crate::storage::StorageError;

    struct Fixture {
        referrals: Arc<MockReferralStore>,
        events: Arc<MockEventStore>,
        configs: Arc<MockXpConfigStore>,
        service: XpService,
    }

    fn fixture() -> Fixture {
        let referrals = Arc::new(MockReferralStore::new());
        let events = Arc::new(MockEventStore::new());
        let configs = Arc::new(MockXpConfigStore::new());
        let service = XpService::new(referrals.clone(), events.clone(), configs.clone());
        Fixture {
            referrals,
            events,
            configs,
            service,
        }
    }

    async fn join_project(fx: &Fixture, wallet: &str, project: &str, tweets: usize, clicks: usize) {
        let referral = fx
            .referrals
            .insert_if_absent(NewReferral::now(wallet, project))
            .await
            .unwrap();
        for _ in 0..tweets {
            fx.events
                .append_tweet(TweetRecord {
                    tweet_id: Uuid::new_v4().to_string(),
                    referral_id: referral.id,
                    posted_at: Utc::now(),
                    engagement: None,
                })
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
    }

    #[tokio::test]
    async fn test_total_sums_across_projects() {
        let fx = fixture();
        for project in ["proj-1", "proj-2"] {
            fx.configs
                .put(
                    project,
                    XpPointsConfig {
                        x_post: 5,
                        click: 2,
                        imp_tiers: vec![],
                    },
                )
                .await
                .unwrap();
        }
        join_project(&fx, "0xabc", "proj-1", 2, 3).await;
        join_project(&fx, "0xabc", "proj-2", 1, 0).await;

        let breakdown = fx
            .service
            .total_for_wallet("0xabc", &["proj-1".to_string(), "proj-2".to_string()])
            .await
            .unwrap();

        // proj-1: 2 * 5 + 3 * 2 = 16; proj-2: 1 * 5 = 5.
        assert_eq!(breakdown.total, 21);
        assert_eq!(breakdown.projects.len(), 2);
        assert_eq!(breakdown.projects[0].points, 16);
        assert_eq!(breakdown.projects[1].points, 5);
    }

    #[tokio::test]
    async fn test_missing_config_scores_zero_without_failing() {
        let fx = fixture();
        fx.configs
            .put(
                "configured",
                XpPointsConfig {
                    x_post: 10,
                    click: 0,
                    imp_tiers: vec![],
                },
            )
            .await
            .unwrap();
        join_project(&fx, "0xabc", "configured", 1, 0).await;
        join_project(&fx, "0xabc", "unconfigured", 4, 4).await;

        let breakdown = fx
            .service
            .total_for_wallet(
                "0xabc",
                &["configured".to_string(), "unconfigured".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(breakdown.total, 10);
        assert_eq!(breakdown.projects[1].points, 0);
    }

    #[tokio::test]
    async fn test_unjoined_project_scores_zero_without_failing() {
        let fx = fixture();
        fx.configs
            .put(
                "proj",
                XpPointsConfig {
                    x_post: 5,
                    click: 1,
                    imp_tiers: vec![ImpressionTier {
                        threshold: 10,
                        points: 3,
                    }],
                },
            )
            .await
            .unwrap();

        let breakdown = fx
            .service
            .total_for_wallet("0xnever", &["proj".to_string()])
            .await
            .unwrap();

        assert_eq!(breakdown.total, 0);
        assert_eq!(
            breakdown.projects,
            vec![ProjectXp {
                project_id: "proj".to_string(),
                points: 0
            }]
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let fx = fixture();
        fx.configs.set_fail_on_read(true).await;

        let result = fx
            .service
            .total_for_wallet("0xabc", &["proj".to_string()])
            .await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }
}
