//! Per-project XP point rule persistence interface.

use async_trait::async_trait;

use super::Result;
use crate::model::XpPointsConfig;

/// Interface for per-project XP point rule lookups.
///
/// A project without a stored config is `None`, never an error; XP scoring
/// treats that project as contributing zero points.
#[async_trait]
pub trait XpConfigStore: Send + Sync {
    /// Point rules for a project, if configured.
    async fn get(&self, project_id: &str) -> Result<Option<XpPointsConfig>>;

    /// Store or replace a project's point rules.
    async fn put(&self, project_id: &str, config: XpPointsConfig) -> Result<()>;
}
