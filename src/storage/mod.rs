//! Storage contracts and implementations.
//!
//! Three trait-based stores back the aggregation core: referral records,
//! per-referral event sub-collections, and per-project XP point rules.
//! SQLite implementations ship behind the `sqlite` feature; in-memory mocks
//! compile unconditionally for tests.

use uuid::Uuid;

use crate::model::ReferralId;

pub mod event_store;
pub mod mock;
pub mod referral_store;
pub mod xp_config_store;

#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use event_store::ReferralEventStore;
pub use referral_store::ReferralStore;
pub use xp_config_store::XpConfigStore;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteEventStore, SqliteReferralStore, SqliteXpConfigStore};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("referral not found: {referral}")]
    ReferralNotFound { referral: ReferralId },

    #[error("no referral for wallet={wallet} project={project}")]
    PairNotFound { wallet: String, project: String },

    #[error("conversion log entry not found: {conversion}")]
    ConversionNotFound { conversion: Uuid },

    #[error("tweet not found: {tweet_id}")]
    TweetNotFound { tweet_id: String },

    #[error("invalid referral key: {0}")]
    InvalidKey(String),

    #[error("invalid timestamp in stored row: {0}")]
    InvalidTimestamp(String),

    #[error("invalid amount in stored row: {0}")]
    InvalidAmount(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Bundle of the three store handles the core depends on.
pub type Stores = (
    std::sync::Arc<dyn ReferralStore>,
    std::sync::Arc<dyn ReferralEventStore>,
    std::sync::Arc<dyn XpConfigStore>,
);

/// Initialize storage based on configuration.
///
/// Creates the SQLite pool, runs `CREATE TABLE IF NOT EXISTS` schema setup,
/// and returns the three store handles.
#[cfg(feature = "sqlite")]
pub async fn init_storage(
    config: &crate::config::StorageConfig,
) -> std::result::Result<Stores, Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use tracing::{error, info};

    info!("Storage: {} at {}", config.storage_type, config.path);

    match config.storage_type.as_str() {
        "sqlite" => {
            if let Some(parent) = std::path::Path::new(&config.path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let pool =
                sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.path)).await?;

            let referral_store = Arc::new(SqliteReferralStore::new(pool.clone()));
            referral_store.init().await?;

            let event_store = Arc::new(SqliteEventStore::new(pool.clone()));
            event_store.init().await?;

            let xp_config_store = Arc::new(SqliteXpConfigStore::new(pool));
            xp_config_store.init().await?;

            Ok((referral_store, event_store, xp_config_store))
        }
        other => {
            error!("Unknown storage type: {}", other);
            Err(format!("Unknown storage type: {}", other).into())
        }
    }
}
