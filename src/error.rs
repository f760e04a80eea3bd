//! Error types for the quiz engine
//!
//! Fallible operations return `anyhow::Result`; the typed cases callers are
//! expected to react to live in [`QuizError`] and can be recovered with
//! `downcast_ref`.

use crate::types::{PlayerId, QuestionId, SubjectId, TopicId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific quiz scenarios
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Player {player_id} has not selected any topics")]
    NoTopicsSelected { player_id: PlayerId },

    #[error("No candidate questions to select from")]
    EmptyCandidatePool,

    #[error("Question not found: {question_id}")]
    QuestionNotFound { question_id: QuestionId },

    #[error("Topic not found: {topic_id}")]
    TopicNotFound { topic_id: TopicId },

    #[error("Subject not found: {subject_id}")]
    SubjectNotFound { subject_id: SubjectId },

    #[error("Invalid rating: {reason}")]
    InvalidRating { reason: String },

    #[error("Invalid answer: {reason}")]
    InvalidAnswer { reason: String },

    #[error(
        "Answer sequence {sequence} for player {player_id} is not after {last_sequence}"
    )]
    OutOfOrderAnswer {
        player_id: PlayerId,
        sequence: u64,
        last_sequence: u64,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl QuizError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            QuizError::NoTopicsSelected { .. } => "no_topics_selected",
            QuizError::EmptyCandidatePool => "empty_candidate_pool",
            QuizError::QuestionNotFound { .. } => "question_not_found",
            QuizError::TopicNotFound { .. } => "topic_not_found",
            QuizError::SubjectNotFound { .. } => "subject_not_found",
            QuizError::InvalidRating { .. } => "invalid_rating",
            QuizError::InvalidAnswer { .. } => "invalid_answer",
            QuizError::OutOfOrderAnswer { .. } => "out_of_order_answer",
            QuizError::ConfigurationError { .. } => "configuration",
            QuizError::InternalError { .. } => "internal",
        }
    }
}
