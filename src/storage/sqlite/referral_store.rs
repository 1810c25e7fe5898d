//! SQLite ReferralStore implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};

use super::{parse_amount, parse_opt_ts, parse_ts};
use crate::model::{EngagementSnapshot, NewReferral, Referral, ReferralId};
use crate::storage::schema::{Referrals, CREATE_REFERRALS_TABLE};
use crate::storage::{ReferralStore, Result, StorageError};

/// SQLite implementation of ReferralStore.
pub struct SqliteReferralStore {
    pool: SqlitePool,
}

impl SqliteReferralStore {
    /// Create a new SQLite referral store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_REFERRALS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<Referral> {
        let id_str: String = row.get("id");
        let created_at: String = row.get("created_at");
        let earnings: String = row.get("earnings");
        let conversions: i64 = row.get("conversions");
        let engagement_json: Option<String> = row.get("engagement");
        let engagement = engagement_json
            .as_deref()
            .map(serde_json::from_str::<EngagementSnapshot>)
            .transpose()?;

        Ok(Referral {
            id: ReferralId::parse_str(&id_str)?,
            affiliate_wallet: row.get("affiliate_wallet"),
            project_id: row.get("project_id"),
            created_at: parse_ts(&created_at)?,
            conversions: conversions as u64,
            earnings: parse_amount(&earnings)?,
            last_conversion_at: parse_opt_ts(row.get("last_conversion_at"))?,
            shared_post_url: row.get("shared_post_url"),
            tweet_newest_id: row.get("tweet_newest_id"),
            tweet_newest_created_at: parse_opt_ts(row.get("tweet_newest_created_at"))?,
            engagement,
        })
    }

    async fn fetch_by_id(&self, id: ReferralId) -> Result<Option<Referral>> {
        let query = Query::select()
            .columns([
                Referrals::Id,
                Referrals::AffiliateWallet,
                Referrals::ProjectId,
                Referrals::CreatedAt,
                Referrals::Conversions,
                Referrals::Earnings,
                Referrals::LastConversionAt,
                Referrals::SharedPostUrl,
                Referrals::TweetNewestId,
                Referrals::TweetNewestCreatedAt,
                Referrals::Engagement,
            ])
            .from(Referrals::Table)
            .and_where(Expr::col(Referrals::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::decode_row).transpose()
    }
}

#[async_trait]
impl ReferralStore for SqliteReferralStore {
    async fn insert_if_absent(&self, referral: NewReferral) -> Result<Referral> {
        let id = referral.id();
        let record = referral.into_referral();

        // ON CONFLICT DO NOTHING makes the write idempotent per pair; the
        // deterministic id guarantees concurrent calls target the same row.
        let insert = Query::insert()
            .into_table(Referrals::Table)
            .columns([
                Referrals::Id,
                Referrals::AffiliateWallet,
                Referrals::ProjectId,
                Referrals::CreatedAt,
                Referrals::Conversions,
                Referrals::Earnings,
                Referrals::LastConversionAt,
                Referrals::SharedPostUrl,
                Referrals::TweetNewestId,
                Referrals::TweetNewestCreatedAt,
                Referrals::Engagement,
            ])
            .values_panic([
                record.id.to_string().into(),
                record.affiliate_wallet.clone().into(),
                record.project_id.clone().into(),
                record.created_at.to_rfc3339().into(),
                (record.conversions as i64).into(),
                record.earnings.to_string().into(),
                Option::<String>::None.into(),
                record.shared_post_url.clone().into(),
                Option::<String>::None.into(),
                Option::<String>::None.into(),
                Option::<String>::None.into(),
            ])
            .on_conflict(OnConflict::column(Referrals::Id).do_nothing().to_owned())
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&self.pool).await?;

        self.fetch_by_id(id)
            .await?
            .ok_or(StorageError::ReferralNotFound { referral: id })
    }

    async fn get(&self, id: ReferralId) -> Result<Option<Referral>> {
        self.fetch_by_id(id).await
    }

    async fn find_by_pair(&self, wallet: &str, project: &str) -> Result<Option<Referral>> {
        // The id is a pure function of the pair, so this is a point lookup.
        self.fetch_by_id(ReferralId::for_pair(wallet, project))
            .await
    }

    async fn list_with_post_urls(&self) -> Result<Vec<Referral>> {
        let query = Query::select()
            .columns([
                Referrals::Id,
                Referrals::AffiliateWallet,
                Referrals::ProjectId,
                Referrals::CreatedAt,
                Referrals::Conversions,
                Referrals::Earnings,
                Referrals::LastConversionAt,
                Referrals::SharedPostUrl,
                Referrals::TweetNewestId,
                Referrals::TweetNewestCreatedAt,
                Referrals::Engagement,
            ])
            .from(Referrals::Table)
            .and_where(Expr::col(Referrals::SharedPostUrl).is_not_null())
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut referrals = Vec::with_capacity(rows.len());
        for row in &rows {
            referrals.push(Self::decode_row(row)?);
        }

        Ok(referrals)
    }

    async fn put_engagement(&self, id: ReferralId, snapshot: EngagementSnapshot) -> Result<()> {
        let json = serde_json::to_string(&snapshot)?;

        let update = Query::update()
            .table(Referrals::Table)
            .value(Referrals::Engagement, json)
            .and_where(Expr::col(Referrals::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&update).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::ReferralNotFound { referral: id });
        }
        Ok(())
    }

    async fn put_newest_tweet(
        &self,
        id: ReferralId,
        tweet_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let update = Query::update()
            .table(Referrals::Table)
            .value(Referrals::TweetNewestId, tweet_id)
            .value(Referrals::TweetNewestCreatedAt, created_at.to_rfc3339())
            .and_where(Expr::col(Referrals::Id).eq(id.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&update).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::ReferralNotFound { referral: id });
        }
        Ok(())
    }
}
