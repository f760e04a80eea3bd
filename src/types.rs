//! Common types used throughout the quiz engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for questions
pub type QuestionId = u64;

/// Unique identifier for topics
pub type TopicId = u64;

/// Unique identifier for subjects
pub type SubjectId = u64;

/// Rating every player-subject pair and every question starts from
pub const DEFAULT_RATING: f64 = 1200.0;

/// A subject groups topics, and players are rated per subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
    pub code: String,
}

/// A topic players subscribe to in order to scope their question pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub subject_id: SubjectId,
    pub title: String,
}

/// Why an answer record exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerKind {
    /// A graded submission
    Graded,
    /// Synthetic record written when the player reports the question.
    /// Blocks immediate repetition but never counts toward streaks.
    ReportSkip,
}

/// One entry in a player's append-only answer log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    /// Strictly increasing per player; the only ordering key
    pub sequence: u64,
    pub player_id: PlayerId,
    pub question_id: QuestionId,
    pub topic_id: TopicId,
    pub correct: bool,
    pub kind: AnswerKind,
    pub answered_at: DateTime<Utc>,
}

impl Answer {
    pub fn is_report_skip(&self) -> bool {
        self.kind == AnswerKind::ReportSkip
    }
}

/// Answer data before the log assigns it a sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnswer {
    pub player_id: PlayerId,
    pub question_id: QuestionId,
    pub topic_id: TopicId,
    pub correct: bool,
    pub kind: AnswerKind,
}

/// Key into the rating store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RatingKey {
    Player {
        player_id: PlayerId,
        subject_id: SubjectId,
    },
    Question(QuestionId),
}

impl RatingKey {
    pub fn player(player_id: impl Into<PlayerId>, subject_id: SubjectId) -> Self {
        RatingKey::Player {
            player_id: player_id.into(),
            subject_id,
        }
    }

    pub fn question(question_id: QuestionId) -> Self {
        RatingKey::Question(question_id)
    }
}

impl std::fmt::Display for RatingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingKey::Player {
                player_id,
                subject_id,
            } => write!(f, "player:{}:{}", player_id, subject_id),
            RatingKey::Question(id) => write!(f, "question:{}", id),
        }
    }
}

/// Rating movement caused by one graded answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_id: PlayerId,
    pub question_id: QuestionId,
    pub old_player_rating: f64,
    pub new_player_rating: f64,
    pub old_question_rating: f64,
    pub new_question_rating: f64,
    /// False when the rating cap suppressed the update
    pub applied: bool,
}

impl RatingChange {
    pub fn player_delta(&self) -> f64 {
        self.new_player_rating - self.old_player_rating
    }

    pub fn question_delta(&self) -> f64 {
        self.new_question_rating - self.old_question_rating
    }
}
