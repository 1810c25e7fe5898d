//! Per-project XP point rules.

use serde::{Deserialize, Serialize};

/// One impression tier: posts reaching `threshold` impressions earn `points`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpressionTier {
    pub threshold: u64,
    pub points: u64,
}

/// A project's configurable XP point rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpPointsConfig {
    /// Points per tweet authored.
    pub x_post: u64,
    /// Points per tracked click.
    pub click: u64,
    /// Impression tiers. Order in the list is irrelevant; selection always
    /// considers thresholds from highest to lowest.
    pub imp_tiers: Vec<ImpressionTier>,
}

impl XpPointsConfig {
    /// Points a single post earns for its impression count.
    ///
    /// The highest tier whose threshold the count meets wins outright;
    /// tiers are not additive. Zero if no tier qualifies.
    pub fn impression_award(&self, impressions: u64) -> u64 {
        let mut tiers: Vec<&ImpressionTier> = self.imp_tiers.iter().collect();
        tiers.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        tiers
            .into_iter()
            .find(|tier| tier.threshold <= impressions)
            .map(|tier| tier.points)
            .unwrap_or(0)
    }
}
