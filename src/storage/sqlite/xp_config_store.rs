//! SQLite XpConfigStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};

use crate::model::{ImpressionTier, XpPointsConfig};
use crate::storage::schema::{XpConfigs, CREATE_XP_CONFIGS_TABLE};
use crate::storage::{Result, XpConfigStore};

/// SQLite implementation of XpConfigStore.
pub struct SqliteXpConfigStore {
    pool: SqlitePool,
}

impl SqliteXpConfigStore {
    /// Create a new SQLite XP config store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_XP_CONFIGS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl XpConfigStore for SqliteXpConfigStore {
    async fn get(&self, project_id: &str) -> Result<Option<XpPointsConfig>> {
        let query = Query::select()
            .columns([XpConfigs::XPost, XpConfigs::Click, XpConfigs::ImpTiers])
            .from(XpConfigs::Table)
            .and_where(Expr::col(XpConfigs::ProjectId).eq(project_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => {
                let x_post: i64 = row.get("x_post");
                let click: i64 = row.get("click");
                let tiers_json: String = row.get("imp_tiers");
                let imp_tiers: Vec<ImpressionTier> = serde_json::from_str(&tiers_json)?;

                Ok(Some(XpPointsConfig {
                    x_post: x_post as u64,
                    click: click as u64,
                    imp_tiers,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, project_id: &str, config: XpPointsConfig) -> Result<()> {
        let tiers_json = serde_json::to_string(&config.imp_tiers)?;

        let insert = Query::insert()
            .into_table(XpConfigs::Table)
            .columns([
                XpConfigs::ProjectId,
                XpConfigs::XPost,
                XpConfigs::Click,
                XpConfigs::ImpTiers,
            ])
            .values_panic([
                project_id.into(),
                (config.x_post as i64).into(),
                (config.click as i64).into(),
                tiers_json.into(),
            ])
            .on_conflict(
                OnConflict::column(XpConfigs::ProjectId)
                    .update_columns([XpConfigs::XPost, XpConfigs::Click, XpConfigs::ImpTiers])
                    .to_owned(),
            )
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&self.pool).await?;
        Ok(())
    }
}
