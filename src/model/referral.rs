//! Referral records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engagement::EngagementSnapshot;

/// Namespace for deriving referral ids from their composite key.
const REFERRAL_NAMESPACE: Uuid = Uuid::from_bytes([
    0xc1, 0xd7, 0xa9, 0xb2, 0x4e, 0x63, 0x4f, 0x58, 0x9b, 0x0a, 0x2f, 0x6d, 0x8e, 0x5c, 0x74,
    0x31,
]);

/// Stable, opaque identifier for a referral.
///
/// Derived deterministically from the (affiliate wallet, project) pair, so
/// the same pair always maps to the same id. This is what makes concurrent
/// `get_or_create` calls collapse onto a single record instead of racing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferralId(Uuid);

impl ReferralId {
    /// Derive the id for an (affiliate wallet, project) pair.
    pub fn for_pair(affiliate_wallet: &str, project_id: &str) -> Self {
        let name = format!("{}/{}", affiliate_wallet, project_id);
        Self(Uuid::new_v5(&REFERRAL_NAMESPACE, name.as_bytes()))
    }

    /// Parse from the hyphenated string form.
    pub fn parse_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ReferralId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ReferralId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// One affiliate's enrollment record for one project.
///
/// Exactly one referral exists per (affiliate wallet, project) pair. Created
/// when the affiliate first joins the project; never deleted by this
/// subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    pub affiliate_wallet: String,
    pub project_id: String,
    /// Set once at creation, immutable afterwards.
    pub created_at: DateTime<Utc>,
    /// Legacy denormalized counter. May lag the conversion log; rollups
    /// recompute from raw events and never read this.
    pub conversions: u64,
    /// Legacy denormalized sum. Same staleness caveat as `conversions`.
    pub earnings: Decimal,
    /// Legacy denormalized timestamp. Same staleness caveat.
    pub last_conversion_at: Option<DateTime<Utc>>,
    /// URL of the social post the affiliate shared, when one is linked.
    /// The engagement refresh scan extracts the external post id from this.
    pub shared_post_url: Option<String>,
    /// Cursor for incremental tweet polling: newest known tweet id.
    pub tweet_newest_id: Option<String>,
    /// Cursor companion: when that newest tweet was posted.
    pub tweet_newest_created_at: Option<DateTime<Utc>>,
    /// Coarse engagement cache, overwritten wholesale by each refresh run.
    pub engagement: Option<EngagementSnapshot>,
}

/// Creation payload for a referral.
///
/// The id is not part of the payload; stores derive it from the pair so the
/// at-most-one invariant holds regardless of caller behavior.
#[derive(Debug, Clone)]
pub struct NewReferral {
    pub affiliate_wallet: String,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub shared_post_url: Option<String>,
}

impl NewReferral {
    /// A referral joining `affiliate_wallet` to `project_id`, created now.
    pub fn now(affiliate_wallet: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            affiliate_wallet: affiliate_wallet.into(),
            project_id: project_id.into(),
            created_at: Utc::now(),
            shared_post_url: None,
        }
    }

    /// Attach the shared social post URL.
    pub fn with_post_url(mut self, url: impl Into<String>) -> Self {
        self.shared_post_url = Some(url.into());
        self
    }

    /// The deterministic id this payload will be stored under.
    pub fn id(&self) -> ReferralId {
        ReferralId::for_pair(&self.affiliate_wallet, &self.project_id)
    }

    /// Materialize the full record with zeroed legacy counters.
    pub fn into_referral(self) -> Referral {
        Referral {
            id: self.id(),
            affiliate_wallet: self.affiliate_wallet,
            project_id: self.project_id,
            created_at: self.created_at,
            conversions: 0,
            earnings: Decimal::ZERO,
            last_conversion_at: None,
            shared_post_url: self.shared_post_url,
            tweet_newest_id: None,
            tweet_newest_created_at: None,
            engagement: None,
        }
    }
}
