//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query
//! building. Timestamps are stored as RFC 3339 TEXT; monetary amounts as
//! decimal TEXT; engagement snapshots and impression tiers as JSON TEXT.

use sea_query::Iden;

/// Referrals table schema.
#[derive(Iden)]
pub enum Referrals {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "affiliate_wallet"]
    AffiliateWallet,
    #[iden = "project_id"]
    ProjectId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "conversions"]
    Conversions,
    #[iden = "earnings"]
    Earnings,
    #[iden = "last_conversion_at"]
    LastConversionAt,
    #[iden = "shared_post_url"]
    SharedPostUrl,
    #[iden = "tweet_newest_id"]
    TweetNewestId,
    #[iden = "tweet_newest_created_at"]
    TweetNewestCreatedAt,
    #[iden = "engagement"]
    Engagement,
}

/// Clicks table schema.
#[derive(Iden)]
pub enum Clicks {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "referral_id"]
    ReferralId,
    #[iden = "occurred_at"]
    OccurredAt,
    #[iden = "ip"]
    Ip,
    #[iden = "country"]
    Country,
    #[iden = "region"]
    Region,
    #[iden = "city"]
    City,
    #[iden = "user_agent"]
    UserAgent,
}

/// Conversion log table schema.
#[derive(Iden)]
pub enum ConversionLogs {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "referral_id"]
    ReferralId,
    #[iden = "occurred_at"]
    OccurredAt,
    #[iden = "amount"]
    Amount,
    #[iden = "conversion_point_id"]
    ConversionPointId,
    #[iden = "is_paid"]
    IsPaid,
    #[iden = "paid_at"]
    PaidAt,
    #[iden = "transaction_hash"]
    TransactionHash,
    #[iden = "user_wallet"]
    UserWallet,
}

/// Tweets table schema.
#[derive(Iden)]
pub enum Tweets {
    Table,
    #[iden = "tweet_id"]
    TweetId,
    #[iden = "referral_id"]
    ReferralId,
    #[iden = "posted_at"]
    PostedAt,
    #[iden = "engagement"]
    Engagement,
}

/// Videos table schema.
#[derive(Iden)]
pub enum Videos {
    Table,
    #[iden = "video_id"]
    VideoId,
    #[iden = "referral_id"]
    ReferralId,
    #[iden = "published_at"]
    PublishedAt,
    #[iden = "views"]
    Views,
    #[iden = "likes"]
    Likes,
    #[iden = "comments"]
    Comments,
    #[iden = "fetched_at"]
    FetchedAt,
}

/// XP config table schema.
#[derive(Iden)]
pub enum XpConfigs {
    Table,
    #[iden = "project_id"]
    ProjectId,
    #[iden = "x_post"]
    XPost,
    #[iden = "click"]
    Click,
    #[iden = "imp_tiers"]
    ImpTiers,
}

/// SQL for creating the referrals table.
pub const CREATE_REFERRALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS referrals (
    id TEXT PRIMARY KEY,
    affiliate_wallet TEXT NOT NULL,
    project_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    conversions INTEGER NOT NULL DEFAULT 0,
    earnings TEXT NOT NULL DEFAULT '0',
    last_conversion_at TEXT,
    shared_post_url TEXT,
    tweet_newest_id TEXT,
    tweet_newest_created_at TEXT,
    engagement TEXT,
    UNIQUE (affiliate_wallet, project_id)
);

CREATE INDEX IF NOT EXISTS idx_referrals_pair ON referrals(affiliate_wallet, project_id);
"#;

/// SQL for creating the clicks table.
pub const CREATE_CLICKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clicks (
    id TEXT PRIMARY KEY,
    referral_id TEXT NOT NULL,
    occurred_at TEXT NOT NULL,
    ip TEXT NOT NULL,
    country TEXT NOT NULL DEFAULT '',
    region TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    user_agent TEXT
);

CREATE INDEX IF NOT EXISTS idx_clicks_referral ON clicks(referral_id);
"#;

/// SQL for creating the conversion log table.
pub const CREATE_CONVERSION_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS conversion_logs (
    id TEXT PRIMARY KEY,
    referral_id TEXT NOT NULL,
    occurred_at TEXT NOT NULL,
    amount TEXT NOT NULL,
    conversion_point_id TEXT NOT NULL,
    is_paid INTEGER NOT NULL DEFAULT 0,
    paid_at TEXT,
    transaction_hash TEXT,
    user_wallet TEXT
);

CREATE INDEX IF NOT EXISTS idx_conversion_logs_referral ON conversion_logs(referral_id);
"#;

/// SQL for creating the tweets table.
pub const CREATE_TWEETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tweets (
    tweet_id TEXT PRIMARY KEY,
    referral_id TEXT NOT NULL,
    posted_at TEXT NOT NULL,
    engagement TEXT
);

CREATE INDEX IF NOT EXISTS idx_tweets_referral ON tweets(referral_id);
"#;

/// SQL for creating the videos table.
pub const CREATE_VIDEOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    video_id TEXT PRIMARY KEY,
    referral_id TEXT NOT NULL,
    published_at TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0,
    likes INTEGER NOT NULL DEFAULT 0,
    comments INTEGER NOT NULL DEFAULT 0,
    fetched_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_videos_referral ON videos(referral_id);
"#;

/// SQL for creating the XP config table.
pub const CREATE_XP_CONFIGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS xp_configs (
    project_id TEXT PRIMARY KEY,
    x_post INTEGER NOT NULL DEFAULT 0,
    click INTEGER NOT NULL DEFAULT 0,
    imp_tiers TEXT NOT NULL DEFAULT '[]'
);
"#;
