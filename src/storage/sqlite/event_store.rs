//! SQLite ReferralEventStore implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_query::{Expr, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_amount, parse_opt_ts, parse_ts};
use crate::model::{
    ClickEvent, ClickOrigin, ConversionLogEntry, EngagementSnapshot, ReferralId, TweetRecord,
    VideoRecord,
};
use crate::storage::schema::{
    Clicks, ConversionLogs, Tweets, Videos, CREATE_CLICKS_TABLE, CREATE_CONVERSION_LOGS_TABLE,
    CREATE_TWEETS_TABLE, CREATE_VIDEOS_TABLE,
};
use crate::storage::{ReferralEventStore, Result, StorageError};

/// SQLite implementation of ReferralEventStore.
///
/// Event rows are append-only; reads return them in insertion order and
/// callers derive any time ordering they need from the event timestamps.
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    /// Create a new SQLite event store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(CREATE_CLICKS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CONVERSION_LOGS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_TWEETS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_VIDEOS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    fn decode_click(row: &sqlx::sqlite::SqliteRow) -> Result<ClickEvent> {
        let id: String = row.get("id");
        let referral_id: String = row.get("referral_id");
        let occurred_at: String = row.get("occurred_at");

        Ok(ClickEvent {
            id: Uuid::parse_str(&id)?,
            referral_id: ReferralId::parse_str(&referral_id)?,
            occurred_at: parse_ts(&occurred_at)?,
            ip: row.get("ip"),
            origin: ClickOrigin {
                country: row.get("country"),
                region: row.get("region"),
                city: row.get("city"),
            },
            user_agent: row.get("user_agent"),
        })
    }

    fn decode_conversion(row: &sqlx::sqlite::SqliteRow) -> Result<ConversionLogEntry> {
        let id: String = row.get("id");
        let referral_id: String = row.get("referral_id");
        let occurred_at: String = row.get("occurred_at");
        let amount: String = row.get("amount");
        let is_paid: i64 = row.get("is_paid");

        Ok(ConversionLogEntry {
            id: Uuid::parse_str(&id)?,
            referral_id: ReferralId::parse_str(&referral_id)?,
            occurred_at: parse_ts(&occurred_at)?,
            amount: parse_amount(&amount)?,
            conversion_point_id: row.get("conversion_point_id"),
            is_paid: is_paid != 0,
            paid_at: parse_opt_ts(row.get("paid_at"))?,
            transaction_hash: row.get("transaction_hash"),
            user_wallet: row.get("user_wallet"),
        })
    }

    fn decode_tweet(row: &sqlx::sqlite::SqliteRow) -> Result<TweetRecord> {
        let referral_id: String = row.get("referral_id");
        let posted_at: String = row.get("posted_at");
        let engagement_json: Option<String> = row.get("engagement");
        let engagement = engagement_json
            .as_deref()
            .map(serde_json::from_str::<EngagementSnapshot>)
            .transpose()?;

        Ok(TweetRecord {
            tweet_id: row.get("tweet_id"),
            referral_id: ReferralId::parse_str(&referral_id)?,
            posted_at: parse_ts(&posted_at)?,
            engagement,
        })
    }

    fn decode_video(row: &sqlx::sqlite::SqliteRow) -> Result<VideoRecord> {
        let referral_id: String = row.get("referral_id");
        let published_at: String = row.get("published_at");
        let views: i64 = row.get("views");
        let likes: i64 = row.get("likes");
        let comments: i64 = row.get("comments");

        Ok(VideoRecord {
            video_id: row.get("video_id"),
            referral_id: ReferralId::parse_str(&referral_id)?,
            published_at: parse_ts(&published_at)?,
            views: views as u64,
            likes: likes as u64,
            comments: comments as u64,
            fetched_at: parse_opt_ts(row.get("fetched_at"))?,
        })
    }
}

#[async_trait]
impl ReferralEventStore for SqliteEventStore {
    async fn clicks(&self, referral: ReferralId) -> Result<Vec<ClickEvent>> {
        let query = Query::select()
            .columns([
                Clicks::Id,
                Clicks::ReferralId,
                Clicks::OccurredAt,
                Clicks::Ip,
                Clicks::Country,
                Clicks::Region,
                Clicks::City,
                Clicks::UserAgent,
            ])
            .from(Clicks::Table)
            .and_where(Expr::col(Clicks::ReferralId).eq(referral.to_string()))
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut clicks = Vec::with_capacity(rows.len());
        for row in &rows {
            clicks.push(Self::decode_click(row)?);
        }
        Ok(clicks)
    }

    async fn conversion_logs(&self, referral: ReferralId) -> Result<Vec<ConversionLogEntry>> {
        let query = Query::select()
            .columns([
                ConversionLogs::Id,
                ConversionLogs::ReferralId,
                ConversionLogs::OccurredAt,
                ConversionLogs::Amount,
                ConversionLogs::ConversionPointId,
                ConversionLogs::IsPaid,
                ConversionLogs::PaidAt,
                ConversionLogs::TransactionHash,
                ConversionLogs::UserWallet,
            ])
            .from(ConversionLogs::Table)
            .and_where(Expr::col(ConversionLogs::ReferralId).eq(referral.to_string()))
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(Self::decode_conversion(row)?);
        }
        Ok(entries)
    }

    async fn tweets(&self, referral: ReferralId) -> Result<Vec<TweetRecord>> {
        let query = Query::select()
            .columns([
                Tweets::TweetId,
                Tweets::ReferralId,
                Tweets::PostedAt,
                Tweets::Engagement,
            ])
            .from(Tweets::Table)
            .and_where(Expr::col(Tweets::ReferralId).eq(referral.to_string()))
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut tweets = Vec::with_capacity(rows.len());
        for row in &rows {
            tweets.push(Self::decode_tweet(row)?);
        }
        Ok(tweets)
    }

    async fn videos(&self, referral: ReferralId) -> Result<Vec<VideoRecord>> {
        let query = Query::select()
            .columns([
                Videos::VideoId,
                Videos::ReferralId,
                Videos::PublishedAt,
                Videos::Views,
                Videos::Likes,
                Videos::Comments,
                Videos::FetchedAt,
            ])
            .from(Videos::Table)
            .and_where(Expr::col(Videos::ReferralId).eq(referral.to_string()))
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut videos = Vec::with_capacity(rows.len());
        for row in &rows {
            videos.push(Self::decode_video(row)?);
        }
        Ok(videos)
    }

    async fn append_click(&self, click: ClickEvent) -> Result<()> {
        let insert = Query::insert()
            .into_table(Clicks::Table)
            .columns([
                Clicks::Id,
                Clicks::ReferralId,
                Clicks::OccurredAt,
                Clicks::Ip,
                Clicks::Country,
                Clicks::Region,
                Clicks::City,
                Clicks::UserAgent,
            ])
            .values_panic([
                click.id.to_string().into(),
                click.referral_id.to_string().into(),
                click.occurred_at.to_rfc3339().into(),
                click.ip.into(),
                click.origin.country.into(),
                click.origin.region.into(),
                click.origin.city.into(),
                click.user_agent.into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&self.pool).await?;
        Ok(())
    }

    async fn append_conversion(&self, entry: ConversionLogEntry) -> Result<()> {
        let insert = Query::insert()
            .into_table(ConversionLogs::Table)
            .columns([
                ConversionLogs::Id,
                ConversionLogs::ReferralId,
                ConversionLogs::OccurredAt,
                ConversionLogs::Amount,
                ConversionLogs::ConversionPointId,
                ConversionLogs::IsPaid,
                ConversionLogs::PaidAt,
                ConversionLogs::TransactionHash,
                ConversionLogs::UserWallet,
            ])
            .values_panic([
                entry.id.to_string().into(),
                entry.referral_id.to_string().into(),
                entry.occurred_at.to_rfc3339().into(),
                entry.amount.to_string().into(),
                entry.conversion_point_id.into(),
                (entry.is_paid as i32).into(),
                entry.paid_at.map(|t| t.to_rfc3339()).into(),
                entry.transaction_hash.into(),
                entry.user_wallet.into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&self.pool).await?;
        Ok(())
    }

    async fn append_tweet(&self, tweet: TweetRecord) -> Result<()> {
        let engagement = tweet
            .engagement
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let insert = Query::insert()
            .into_table(Tweets::Table)
            .columns([
                Tweets::TweetId,
                Tweets::ReferralId,
                Tweets::PostedAt,
                Tweets::Engagement,
            ])
            .values_panic([
                tweet.tweet_id.into(),
                tweet.referral_id.to_string().into(),
                tweet.posted_at.to_rfc3339().into(),
                engagement.into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&self.pool).await?;
        Ok(())
    }

    async fn append_video(&self, video: VideoRecord) -> Result<()> {
        let insert = Query::insert()
            .into_table(Videos::Table)
            .columns([
                Videos::VideoId,
                Videos::ReferralId,
                Videos::PublishedAt,
                Videos::Views,
                Videos::Likes,
                Videos::Comments,
                Videos::FetchedAt,
            ])
            .values_panic([
                video.video_id.into(),
                video.referral_id.to_string().into(),
                video.published_at.to_rfc3339().into(),
                (video.views as i64).into(),
                (video.likes as i64).into(),
                (video.comments as i64).into(),
                video.fetched_at.map(|t| t.to_rfc3339()).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&self.pool).await?;
        Ok(())
    }

    async fn put_tweet_engagement(
        &self,
        tweet_id: &str,
        snapshot: EngagementSnapshot,
    ) -> Result<()> {
        let json = serde_json::to_string(&snapshot)?;

        let update = Query::update()
            .table(Tweets::Table)
            .value(Tweets::Engagement, json)
            .and_where(Expr::col(Tweets::TweetId).eq(tweet_id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&update).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::TweetNotFound {
                tweet_id: tweet_id.to_string(),
            });
        }
        Ok(())
    }

    async fn mark_conversion_paid(
        &self,
        conversion: Uuid,
        paid_at: DateTime<Utc>,
        transaction_hash: &str,
    ) -> Result<()> {
        let update = Query::update()
            .table(ConversionLogs::Table)
            .value(ConversionLogs::IsPaid, 1)
            .value(ConversionLogs::PaidAt, paid_at.to_rfc3339())
            .value(ConversionLogs::TransactionHash, transaction_hash)
            .and_where(Expr::col(ConversionLogs::Id).eq(conversion.to_string()))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&update).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::ConversionNotFound { conversion });
        }
        Ok(())
    }
}
