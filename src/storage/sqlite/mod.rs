//! SQLite implementations of storage interfaces.

mod event_store;
mod referral_store;
mod xp_config_store;

pub use event_store::SqliteEventStore;
pub use referral_store::SqliteReferralStore;
pub use xp_config_store::SqliteXpConfigStore;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{Result, StorageError};

/// Decode an RFC 3339 TEXT column.
fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", raw, e)))
}

/// Decode a nullable RFC 3339 TEXT column.
fn parse_opt_ts(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_ts).transpose()
}

/// Decode a decimal TEXT column.
fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| StorageError::InvalidAmount(format!("{}: {}", raw, e)))
}
