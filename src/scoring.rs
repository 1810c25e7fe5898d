//! Pure XP computation for one project.

use crate::model::{ClickEvent, TweetRecord, XpPointsConfig};

/// XP a wallet earns in one project from its tweets and clicks.
///
/// Flat points per tweet authored, plus each tweet's single best impression
/// tier, plus flat points per click. Saturating; a pathological config
/// cannot panic the computation.
pub fn project_xp(config: &XpPointsConfig, tweets: &[TweetRecord], clicks: &[ClickEvent]) -> u64 {
    let mut total = (tweets.len() as u64).saturating_mul(config.x_post);

    for tweet in tweets {
        total = total.saturating_add(config.impression_award(tweet.impressions()));
    }

    total.saturating_add((clicks.len() as u64).saturating_mul(config.click))
}
