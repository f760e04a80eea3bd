//! Rating updater trait
//!
//! This module defines the interface the engine uses to turn one graded
//! answer into new player and question ratings.

use serde::{Deserialize, Serialize};

/// Result of applying one answer to a (player, question) rating pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub player_rating: f64,
    pub question_rating: f64,
    /// False when the update was suppressed and both ratings are unchanged
    pub applied: bool,
}

impl RatingUpdate {
    /// Both ratings returned as they came in
    pub fn unchanged(player_rating: f64, question_rating: f64) -> Self {
        Self {
            player_rating,
            question_rating,
            applied: false,
        }
    }
}

/// Trait for calculating rating changes after an answer
pub trait RatingUpdater: Send + Sync {
    /// Calculate new ratings for a player and a question
    ///
    /// # Arguments
    /// * `player_rating` - the player's rating in the question's subject
    /// * `question_rating` - the question's current rating
    /// * `outcome` - true when the player answered correctly
    fn update(
        &self,
        player_rating: f64,
        question_rating: f64,
        outcome: bool,
    ) -> crate::error::Result<RatingUpdate>;

    /// Get the initial rating for new players and questions
    fn initial_rating(&self) -> f64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_update() {
        let update = RatingUpdate::unchanged(1400.0, 1200.0);
        assert_eq!(update.player_rating, 1400.0);
        assert_eq!(update.question_rating, 1200.0);
        assert!(!update.applied);
    }
}
