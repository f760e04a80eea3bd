//! Rating system configuration

use crate::rating::elo::{EloConfig, PLAYER_K, QUESTION_K, RATING_CAP};
use crate::types::DEFAULT_RATING;
use serde::{Deserialize, Serialize};

/// Elo parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Starting rating for new player-subject pairs. Questions start from
    /// the rating in their catalog entry instead.
    pub default_rating: f64,
    pub player_k: f64,
    pub question_k: f64,
    /// Player-over-question lead at which updates stop
    pub rating_cap: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            default_rating: DEFAULT_RATING,
            player_k: PLAYER_K,
            question_k: QUESTION_K,
            rating_cap: RATING_CAP,
        }
    }
}

impl From<&RatingSettings> for EloConfig {
    fn from(settings: &RatingSettings) -> Self {
        Self {
            player_k: settings.player_k,
            question_k: settings.question_k,
            rating_cap: settings.rating_cap,
            initial_rating: settings.default_rating,
        }
    }
}
