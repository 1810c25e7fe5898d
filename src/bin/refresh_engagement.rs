//! reftally-refresh: scheduled engagement refresh job
//!
//! One-shot batch run, meant to be invoked weekly from cron or CI. Loads
//! configuration, wires the SQLite stores, the HTTP engagement source, and
//! the configured notifier, runs the refresh once, and exits. The process
//! exits non-zero when the run fails outright; per-batch failures are
//! absorbed into the run summary instead.
//!
//! ## Configuration
//! - REFTALLY_CONFIG: config file path (default: config.yaml)
//! - ENGAGEMENT_API_TOKEN: bearer token for the metrics endpoint (required)
//! - REFTALLY_LOG: tracing filter (default: info)

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use reftally::bootstrap::init_tracing;
use reftally::config::Config;
use reftally::engagement::{EngagementRefreshJob, EngagementSourceConfig, HttpEngagementSource};
use reftally::notify::{Notifier, NullNotifier, WebhookNotifier};
use reftally::storage::init_storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting reftally-refresh");

    let (referral_store, _event_store, _xp_config_store) = init_storage(&config.storage).await?;

    let token =
        std::env::var("ENGAGEMENT_API_TOKEN").map_err(|_| "ENGAGEMENT_API_TOKEN not set")?;

    let source_config = EngagementSourceConfig::default()
        .with_endpoint(config.engagement.endpoint.clone())
        .with_bearer_token(token)
        .with_timeout(Duration::from_secs(config.engagement.timeout_secs))
        .with_batch_size(config.engagement.batch_size);
    let source = Arc::new(HttpEngagementSource::new(source_config)?);

    let notifier: Arc<dyn Notifier> = match &config.notifier.webhook_url {
        Some(url) => {
            info!("Run outcomes will be posted to the configured webhook");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            info!("No webhook configured, run outcomes will only be logged");
            Arc::new(NullNotifier)
        }
    };

    let job = EngagementRefreshJob::new(
        referral_store,
        source,
        notifier,
        config.engagement.batch_size,
    );

    job.run().await?;

    Ok(())
}
