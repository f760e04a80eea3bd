//! Closest-rating question selection
//!
//! Candidates are ordered by distance between their rating and the player's
//! virtual rating. The first one outside the recent-answer window wins.

use crate::error::QuizError;
use crate::question::Question;
use crate::types::QuestionId;
use crate::utils::{ensure_finite, rating_difference};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of most recent answers whose questions are not served again
pub const REPEAT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub repeat_window: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            repeat_window: REPEAT,
        }
    }
}

/// The chosen question and how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub question: Question,
    /// Distance from the virtual rating
    pub distance: f64,
    /// True when every candidate was recently answered
    pub fallback: bool,
}

/// Trait for question selection strategies
pub trait QuestionSelector: Send + Sync {
    /// Pick the next question to present
    ///
    /// # Arguments
    /// * `pool` - candidates on the player's topics, carrying current ratings
    /// * `virtual_rating` - the player's streak-adjusted rating
    /// * `recent_window` - recently answered questions, most recent first
    fn select_next(
        &self,
        pool: &[Question],
        virtual_rating: f64,
        recent_window: &[QuestionId],
    ) -> crate::error::Result<SelectionOutcome>;
}

/// Selects the candidate whose rating is closest to the player's
#[derive(Debug, Clone, Default)]
pub struct ClosestRatingSelector {
    config: SelectionConfig,
}

impl ClosestRatingSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Pool indices ordered closest first. The sort is stable, so equal
    /// distances keep input order.
    fn ordered_candidates(&self, pool: &[Question], virtual_rating: f64) -> Vec<(usize, f64)> {
        let mut ordered: Vec<(usize, f64)> = pool
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let distance = rating_difference(question.rating(), virtual_rating);
                (
                    index,
                    if distance.is_nan() {
                        f64::INFINITY
                    } else {
                        distance
                    },
                )
            })
            .collect();

        ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
        ordered
    }
}

impl QuestionSelector for ClosestRatingSelector {
    fn select_next(
        &self,
        pool: &[Question],
        virtual_rating: f64,
        recent_window: &[QuestionId],
    ) -> crate::error::Result<SelectionOutcome> {
        if pool.is_empty() {
            return Err(QuizError::EmptyCandidatePool.into());
        }
        let virtual_rating = ensure_finite(virtual_rating, "virtual rating")?;

        let window: Vec<QuestionId> = recent_window
            .iter()
            .take(self.config.repeat_window)
            .copied()
            .collect();
        let ordered = self.ordered_candidates(pool, virtual_rating);

        if let Some(&(index, distance)) = ordered
            .iter()
            .find(|(index, _)| !window.contains(&pool[*index].id()))
        {
            debug!(
                question_id = pool[index].id(),
                distance, virtual_rating, "Selected closest question"
            );
            return Ok(SelectionOutcome {
                question: pool[index].clone(),
                distance,
                fallback: false,
            });
        }

        // Every candidate sits in the window: re-serve the one answered
        // longest ago, closest first among equals.
        let mut chosen = ordered[0];
        let mut oldest_position = window
            .iter()
            .position(|id| *id == pool[chosen.0].id())
            .unwrap_or(0);
        for &(index, distance) in ordered.iter().skip(1) {
            let position = window
                .iter()
                .position(|id| *id == pool[index].id())
                .unwrap_or(0);
            if position > oldest_position {
                oldest_position = position;
                chosen = (index, distance);
            }
        }

        warn!(
            question_id = pool[chosen.0].id(),
            pool_size = pool.len(),
            "All candidates recently answered, re-serving least recent"
        );

        Ok(SelectionOutcome {
            question: pool[chosen.0].clone(),
            distance: chosen.1,
            fallback: true,
        })
    }
}
