//! Streak-adjusted "virtual" ratings
//!
//! The virtual rating nudges a player's stored rating up or down by their
//! last few answers so that a hot or cold streak shows up in question
//! selection immediately. It is never persisted.

use crate::types::Answer;
use serde::{Deserialize, Serialize};

/// Number of recent answers that count toward the streak
pub const VIRTUAL_C: usize = 5;

/// Rating points per answer in the streak window
pub const VIRTUAL_K: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualRatingConfig {
    pub window: usize,
    pub step: f64,
}

impl Default for VirtualRatingConfig {
    fn default() -> Self {
        Self {
            window: VIRTUAL_C,
            step: VIRTUAL_K,
        }
    }
}

/// Computes virtual ratings from most-recent-first answer history
#[derive(Debug, Clone, Default)]
pub struct VirtualRatingEstimator {
    config: VirtualRatingConfig,
}

impl VirtualRatingEstimator {
    pub fn new(config: VirtualRatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VirtualRatingConfig {
        &self.config
    }

    /// Sum of `+step` per correct and `-step` per incorrect answer among the
    /// first `window` non-report-skip answers.
    pub fn virtual_delta(&self, recent_answers: &[Answer]) -> f64 {
        recent_answers
            .iter()
            .filter(|answer| !answer.is_report_skip())
            .take(self.config.window)
            .map(|answer| {
                if answer.correct {
                    self.config.step
                } else {
                    -self.config.step
                }
            })
            .sum()
    }

    /// `recent_answers` must be ordered most recent first
    pub fn virtual_rating(&self, base_rating: f64, recent_answers: &[Answer]) -> f64 {
        base_rating + self.virtual_delta(recent_answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnswerKind;
    use crate::utils::{current_timestamp, generate_answer_id};

    fn answer(sequence: u64, correct: bool, kind: AnswerKind) -> Answer {
        Answer {
            id: generate_answer_id(),
            sequence,
            player_id: "player1".to_string(),
            question_id: sequence,
            topic_id: 1,
            correct,
            kind,
            answered_at: current_timestamp(),
        }
    }

    /// Build most-recent-first history from outcomes
    fn history(outcomes: &[bool]) -> Vec<Answer> {
        let n = outcomes.len() as u64;
        outcomes
            .iter()
            .enumerate()
            .map(|(i, &correct)| answer(n - i as u64, correct, AnswerKind::Graded))
            .collect()
    }

    #[test]
    fn test_empty_history_is_base_rating() {
        let estimator = VirtualRatingEstimator::default();
        assert_eq!(estimator.virtual_rating(1200.0, &[]), 1200.0);
    }

    #[test]
    fn test_all_correct_window() {
        let estimator = VirtualRatingEstimator::default();
        let answers = history(&[true; 5]);
        assert_eq!(estimator.virtual_rating(1200.0, &answers), 1250.0);
    }

    #[test]
    fn test_balanced_window_cancels() {
        let estimator = VirtualRatingEstimator::default();
        let answers = history(&[true, false, true, false]);
        assert_eq!(estimator.virtual_rating(1317.5, &answers), 1317.5);
    }

    #[test]
    fn test_two_correct_three_incorrect() {
        let estimator = VirtualRatingEstimator::default();
        let answers = history(&[true, false, false, true, false]);
        assert_eq!(estimator.virtual_delta(&answers), -10.0);
    }

    #[test]
    fn test_only_window_counts() {
        let estimator = VirtualRatingEstimator::default();
        // five losses then a long run of older wins
        let mut outcomes = vec![false; 5];
        outcomes.extend([true; 10]);
        let answers = history(&outcomes);
        assert_eq!(estimator.virtual_rating(1200.0, &answers), 1150.0);
    }

    #[test]
    fn test_report_skips_are_ignored() {
        let estimator = VirtualRatingEstimator::default();
        let with_skip = vec![
            answer(3, false, AnswerKind::ReportSkip),
            answer(2, true, AnswerKind::Graded),
            answer(1, true, AnswerKind::Graded),
        ];
        let without_skip = history(&[true, true]);
        assert_eq!(
            estimator.virtual_rating(1200.0, &with_skip),
            estimator.virtual_rating(1200.0, &without_skip)
        );
        assert_eq!(estimator.virtual_rating(1200.0, &with_skip), 1220.0);
    }

    #[test]
    fn test_report_skips_do_not_use_window_slots() {
        let estimator = VirtualRatingEstimator::default();
        let mut answers = vec![
            answer(10, false, AnswerKind::ReportSkip),
            answer(9, false, AnswerKind::ReportSkip),
        ];
        answers.extend(history(&[true; 5]));
        assert_eq!(estimator.virtual_delta(&answers), 50.0);
    }

    #[test]
    fn test_custom_config() {
        let estimator = VirtualRatingEstimator::new(VirtualRatingConfig {
            window: 2,
            step: 25.0,
        });
        let answers = history(&[true, true, false]);
        assert_eq!(estimator.virtual_rating(1000.0, &answers), 1050.0);
    }
}
