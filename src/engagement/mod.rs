//! Scheduled engagement refresh.
//!
//! Scans referrals with shared post URLs, fetches latest engagement
//! counters from the external metrics endpoint batch by batch, and
//! overwrites each matched referral's coarse engagement cache. One failed
//! batch never stops the rest of the run.

pub mod post_id;
pub mod source;

pub use source::{
    EngagementSource, EngagementSourceConfig, HttpEngagementSource, PostEngagement, SourceError,
};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::model::{EngagementSnapshot, ReferralId};
use crate::notify::Notifier;
use crate::storage::{ReferralStore, StorageError};

/// Errors that abort a whole refresh run.
///
/// Per-batch fetch failures are absorbed into the summary instead; only the
/// initial referral scan can fail the run outright.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of one refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Referrals carrying a shared post URL.
    pub scanned: usize,
    /// Referrals whose URL yielded no parsable post id.
    pub skipped_unparsable: usize,
    /// Referrals whose engagement cache was overwritten.
    pub updated: usize,
    /// Batches whose fetch failed after retries.
    pub failed_batches: usize,
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "engagement refresh: {} referrals scanned, {} updated, {} skipped (unparsable URL), {} failed batches",
            self.scanned, self.updated, self.skipped_unparsable, self.failed_batches
        )
    }
}

/// One-shot engagement refresh over every referral with a shared post.
///
/// Batches are fetched sequentially to respect the endpoint's rate limit;
/// cache writes within a batch run concurrently.
pub struct EngagementRefreshJob {
    referrals: Arc<dyn ReferralStore>,
    source: Arc<dyn EngagementSource>,
    notifier: Arc<dyn Notifier>,
    batch_size: usize,
}

impl EngagementRefreshJob {
    pub fn new(
        referrals: Arc<dyn ReferralStore>,
        source: Arc<dyn EngagementSource>,
        notifier: Arc<dyn Notifier>,
        batch_size: usize,
    ) -> Self {
        Self {
            referrals,
            source,
            notifier,
            // chunks() panics on zero
            batch_size: batch_size.max(1),
        }
    }

    /// Run the refresh once and notify the outcome.
    ///
    /// Notifier failures are logged, never escalated.
    pub async fn run(&self) -> Result<RefreshSummary, RefreshError> {
        match self.execute().await {
            Ok(summary) => {
                info!(%summary, "engagement refresh finished");
                self.notify(&summary.to_string()).await;
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "engagement refresh failed");
                self.notify(&format!("engagement refresh failed: {}", e))
                    .await;
                Err(e)
            }
        }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.notify(text).await {
            warn!(notifier = %self.notifier.name(), error = %e, "notification failed");
        }
    }

    async fn execute(&self) -> Result<RefreshSummary, RefreshError> {
        let referrals = self.referrals.list_with_post_urls().await?;
        let mut summary = RefreshSummary {
            scanned: referrals.len(),
            ..Default::default()
        };

        // Unique post ids in scan order; several referrals may share one
        // post, and each gets the same counters written back.
        let mut post_ids: Vec<String> = Vec::new();
        let mut owners: HashMap<String, Vec<ReferralId>> = HashMap::new();
        for referral in &referrals {
            let Some(url) = referral.shared_post_url.as_deref() else {
                continue;
            };
            match post_id::extract_post_id(url) {
                Some(id) => {
                    let entry = owners.entry(id.clone()).or_default();
                    if entry.is_empty() {
                        post_ids.push(id);
                    }
                    entry.push(referral.id);
                }
                None => {
                    warn!(referral = %referral.id, url, "share URL has no post id, skipping");
                    summary.skipped_unparsable += 1;
                }
            }
        }

        for batch in post_ids.chunks(self.batch_size) {
            let fetched = match self.source.fetch_batch(batch).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    error!(
                        error = %e,
                        batch_len = batch.len(),
                        "engagement batch fetch failed, continuing with next batch"
                    );
                    summary.failed_batches += 1;
                    self.notify(&format!("engagement batch failed: {}", e)).await;
                    continue;
                }
            };

            let fetched_at = Utc::now();
            let mut writes = Vec::new();
            for post in &fetched {
                let Some(referral_ids) = owners.get(&post.post_id) else {
                    // Response row for an id we never asked about.
                    continue;
                };
                for &id in referral_ids {
                    let snapshot = EngagementSnapshot {
                        counts: post.counts,
                        fetched_at,
                    };
                    writes.push(async move {
                        (id, self.referrals.put_engagement(id, snapshot).await)
                    });
                }
            }

            for (id, result) in join_all(writes).await {
                match result {
                    Ok(()) => summary.updated += 1,
                    Err(e) => {
                        warn!(referral = %id, error = %e, "engagement cache write failed")
                    }
                }
            }
        }

        Ok(summary)
    }
}
