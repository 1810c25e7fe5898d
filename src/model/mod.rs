//! Domain model for referral performance aggregation.
//!
//! Referrals anchor everything: one record per (affiliate wallet, project)
//! pair, with typed event sub-collections (clicks, conversion log entries,
//! tweets, videos) hanging off each referral. Aggregates are always derived
//! from the raw events; the denormalized counters on `Referral` are a legacy
//! cache and are never trusted for presentation.

mod engagement;
mod events;
mod metrics;
mod referral;
mod xp;

pub use engagement::{EngagementCounts, EngagementSnapshot, TweetRecord, VideoRecord};
pub use events::{ClickEvent, ClickOrigin, ConversionLogEntry};
pub use metrics::AggregatedMetrics;
pub use referral::{NewReferral, Referral, ReferralId};
pub use xp::{ImpressionTier, XpPointsConfig};
