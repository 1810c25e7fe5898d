//! Derived rollup statistics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rollup statistics recomputed from a referral's raw events.
///
/// Never persisted as a source of truth; dashboards and payout decisions
/// read this, not the legacy counters on `Referral`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    /// Sum of `amount` over every conversion log entry, paid or not.
    /// Gross pipeline value; whether unpaid entries belong here is a
    /// pending product decision, and the observed behavior is preserved.
    pub earnings: Decimal,
    /// Number of conversion log entries.
    pub conversions: u64,
    /// Timestamp of the most recent conversion, if any.
    pub last_conversion_at: Option<DateTime<Utc>>,
    /// Number of recorded clicks.
    pub clicks: u64,
}
