//! Raw event facts attached to a referral.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::referral::ReferralId;

/// Geolocation of a click, as resolved at ingest time.
///
/// Empty strings mean the lookup could not resolve that level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOrigin {
    pub country: String,
    pub region: String,
    pub city: String,
}

/// One tracked click on a referral link. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: Uuid,
    pub referral_id: ReferralId,
    pub occurred_at: DateTime<Utc>,
    pub ip: String,
    pub origin: ClickOrigin,
    pub user_agent: Option<String>,
}

/// One reward-eligible conversion attributed to a referral.
///
/// Immutable after creation except for the settlement triple (`is_paid`,
/// `paid_at`, `transaction_hash`), which payment settlement flips exactly
/// once via the store's `mark_conversion_paid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionLogEntry {
    pub id: Uuid,
    pub referral_id: ReferralId,
    pub occurred_at: DateTime<Utc>,
    /// Reward value of this conversion. Non-negative.
    pub amount: Decimal,
    /// Which conversion-point rule fired.
    pub conversion_point_id: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub transaction_hash: Option<String>,
    /// Wallet of the converting end user, when known.
    pub user_wallet: Option<String>,
}

impl ConversionLogEntry {
    /// An unpaid entry recorded at `occurred_at`.
    pub fn unpaid(
        referral_id: ReferralId,
        occurred_at: DateTime<Utc>,
        amount: Decimal,
        conversion_point_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            referral_id,
            occurred_at,
            amount,
            conversion_point_id: conversion_point_id.into(),
            is_paid: false,
            paid_at: None,
            transaction_hash: None,
            user_wallet: None,
        }
    }
}
