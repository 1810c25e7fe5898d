//! Referral lifecycle: enrollment and lookup.

use std::sync::Arc;

use tracing::debug;

use crate::model::{NewReferral, Referral};
use crate::storage::{ReferralStore, Result, StorageError};

/// Enforces the one-referral-per-(wallet, project) rule.
///
/// Creation goes through the store's insert-if-absent write keyed by the
/// deterministic pair id, so two concurrent joins for the same pair resolve
/// to the same record instead of racing.
pub struct ReferralManager {
    referrals: Arc<dyn ReferralStore>,
}

impl ReferralManager {
    pub fn new(referrals: Arc<dyn ReferralStore>) -> Self {
        Self { referrals }
    }

    /// The referral for this pair, created on first call.
    ///
    /// Subsequent calls return the existing record unchanged.
    pub async fn get_or_create(&self, wallet: &str, project: &str) -> Result<Referral> {
        validate_pair(wallet, project)?;

        let referral = self
            .referrals
            .insert_if_absent(NewReferral::now(wallet, project))
            .await?;
        debug!(referral = %referral.id, wallet, project, "referral resolved");
        Ok(referral)
    }

    /// The referral for this pair. Never creates.
    ///
    /// Fails with `PairNotFound` when the affiliate has not joined the
    /// project.
    pub async fn find(&self, wallet: &str, project: &str) -> Result<Referral> {
        validate_pair(wallet, project)?;

        self.referrals
            .find_by_pair(wallet, project)
            .await?
            .ok_or_else(|| StorageError::PairNotFound {
                wallet: wallet.to_string(),
                project: project.to_string(),
            })
    }
}

fn validate_pair(wallet: &str, project: &str) -> Result<()> {
    if wallet.trim().is_empty() {
        return Err(StorageError::InvalidKey(
            "affiliate wallet must not be blank".to_string(),
        ));
    }
    if project.trim().is_empty() {
        return Err(StorageError::InvalidKey(
            "project id must not be blank".to_string(),
        ));
    }
    Ok(())
}
