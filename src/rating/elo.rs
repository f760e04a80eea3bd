//! Elo rating updates between players and questions
//!
//! A correct answer is a win for the player and a loss for the question.
//! The expectation is the classic logistic curve from the skillratings crate;
//! the two sides use different K factors, so an update is not zero-sum in
//! magnitude, only in direction.

use crate::error::QuizError;
use crate::rating::calculator::{RatingUpdate, RatingUpdater};
use crate::types::DEFAULT_RATING;
use crate::utils::ensure_finite;
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;
use tracing::debug;

/// K factor applied to the player's side of an update
pub const PLAYER_K: f64 = 16.0;

/// K factor applied to the question's side of an update
pub const QUESTION_K: f64 = 8.0;

/// Once a player outrates a question by this much, answering it moves nothing
pub const RATING_CAP: f64 = 150.0;

/// Configuration for the Elo updater
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EloConfig {
    pub player_k: f64,
    pub question_k: f64,
    pub rating_cap: f64,
    /// Rating for players and questions seen for the first time
    pub initial_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            player_k: PLAYER_K,
            question_k: QUESTION_K,
            rating_cap: RATING_CAP,
            initial_rating: DEFAULT_RATING,
        }
    }
}

impl EloConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(self.player_k > 0.0) || !self.player_k.is_finite() {
            return Err(QuizError::ConfigurationError {
                message: "Player K factor must be positive".to_string(),
            }
            .into());
        }

        if !(self.question_k > 0.0) || !self.question_k.is_finite() {
            return Err(QuizError::ConfigurationError {
                message: "Question K factor must be positive".to_string(),
            }
            .into());
        }

        if !(self.rating_cap > 0.0) {
            return Err(QuizError::ConfigurationError {
                message: "Rating cap must be positive".to_string(),
            }
            .into());
        }

        if !(self.initial_rating > 0.0) || !self.initial_rating.is_finite() {
            return Err(QuizError::ConfigurationError {
                message: "Initial rating must be a positive number".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Probability that a side rated `a` beats a side rated `b`
pub fn expected_score(a: f64, b: f64) -> f64 {
    let (expected, _) =
        skillratings::elo::expected_score(&EloRating { rating: a }, &EloRating { rating: b });
    expected
}

/// Elo updater for player/question pairs
#[derive(Debug, Clone)]
pub struct EloRatingUpdater {
    config: EloConfig,
}

impl EloRatingUpdater {
    /// Create a new Elo updater
    pub fn new(config: EloConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn elo_config(&self) -> &EloConfig {
        &self.config
    }

    /// The cap is checked in one direction only. A question that far
    /// outrates a player still moves.
    pub fn is_capped(&self, player_rating: f64, question_rating: f64) -> bool {
        player_rating - question_rating >= self.config.rating_cap
    }
}

impl Default for EloRatingUpdater {
    fn default() -> Self {
        Self {
            config: EloConfig::default(),
        }
    }
}

impl RatingUpdater for EloRatingUpdater {
    fn update(
        &self,
        player_rating: f64,
        question_rating: f64,
        outcome: bool,
    ) -> crate::error::Result<RatingUpdate> {
        let player_rating = ensure_finite(player_rating, "player rating")?;
        let question_rating = ensure_finite(question_rating, "question rating")?;

        if self.is_capped(player_rating, question_rating) {
            debug!(
                player_rating,
                question_rating, "Rating cap reached, update suppressed"
            );
            return Ok(RatingUpdate::unchanged(player_rating, question_rating));
        }

        let win = if outcome { 1.0 } else { 0.0 };

        let new_player_rating = player_rating
            + self.config.player_k * (win - expected_score(player_rating, question_rating));
        let new_question_rating = question_rating
            + self.config.question_k
                * ((1.0 - win) - expected_score(question_rating, player_rating));

        debug!(
            player_rating,
            question_rating,
            new_player_rating,
            new_question_rating,
            outcome,
            "Applied Elo update"
        );

        Ok(RatingUpdate {
            player_rating: new_player_rating,
            question_rating: new_question_rating,
            applied: true,
        })
    }

    fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "player_k": self.config.player_k,
            "question_k": self.config.question_k,
            "rating_cap": self.config.rating_cap,
            "initial_rating": self.config.initial_rating
        })
    }
}
