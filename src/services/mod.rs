//! Services composing the stores with the pure calculators.

pub mod metrics;
pub mod xp;

pub use metrics::{BatchMetrics, MetricsService};
pub use xp::{ProjectXp, XpBreakdown, XpService};
