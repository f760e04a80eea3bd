//! Question content model
//!
//! Every answer kind is a variant of [`Question`]; grading dispatches on the
//! variant instead of probing separate collections per kind.

pub mod normalize;

use crate::error::QuizError;
use crate::types::{PlayerId, QuestionId, TopicId, DEFAULT_RATING};
use serde::{Deserialize, Serialize};

pub use normalize::{normalize_numeral, numerals_match, text_matches};

fn default_rating() -> f64 {
    DEFAULT_RATING
}

/// Fields shared by all answer kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub text: String,
    /// Starting rating, or the current rating once read from the store
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub creator: Option<PlayerId>,
}

/// One alternative of a multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    TrueFalse {
        info: QuestionInfo,
        answer: bool,
    },
    MultipleChoice {
        info: QuestionInfo,
        options: Vec<ChoiceOption>,
    },
    Text {
        info: QuestionInfo,
        answer: String,
    },
    Number {
        info: QuestionInfo,
        answer: String,
    },
}

/// A player's submission before grading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawAnswer {
    Bool(bool),
    /// Index into a multiple-choice question's options
    Choice(usize),
    Text(String),
}

/// Grading result returned to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub question_id: QuestionId,
    pub answered_correct: bool,
    pub correct_answer: String,
}

fn invalid_answer(reason: impl Into<String>) -> anyhow::Error {
    QuizError::InvalidAnswer {
        reason: reason.into(),
    }
    .into()
}

impl Question {
    pub fn info(&self) -> &QuestionInfo {
        match self {
            Question::TrueFalse { info, .. }
            | Question::MultipleChoice { info, .. }
            | Question::Text { info, .. }
            | Question::Number { info, .. } => info,
        }
    }

    pub fn info_mut(&mut self) -> &mut QuestionInfo {
        match self {
            Question::TrueFalse { info, .. }
            | Question::MultipleChoice { info, .. }
            | Question::Text { info, .. }
            | Question::Number { info, .. } => info,
        }
    }

    pub fn id(&self) -> QuestionId {
        self.info().id
    }

    pub fn topic_id(&self) -> TopicId {
        self.info().topic_id
    }

    pub fn rating(&self) -> f64 {
        self.info().rating
    }

    /// Copy of the question carrying a different rating
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.info_mut().rating = rating;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Question::TrueFalse { .. } => "true_false",
            Question::MultipleChoice { .. } => "multiple_choice",
            Question::Text { .. } => "text",
            Question::Number { .. } => "number",
        }
    }

    /// Human-readable form of the expected answer
    pub fn correct_answer(&self) -> String {
        match self {
            Question::TrueFalse { answer, .. } => answer.to_string(),
            Question::MultipleChoice { options, .. } => options
                .iter()
                .filter(|option| option.correct)
                .map(|option| option.text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Question::Text { answer, .. } | Question::Number { answer, .. } => answer.clone(),
        }
    }

    /// Check the content is gradeable at all
    pub fn validate(&self) -> crate::error::Result<()> {
        match self {
            Question::MultipleChoice { info, options } => {
                if !options.iter().any(|option| option.correct) {
                    return Err(QuizError::InvalidAnswer {
                        reason: format!(
                            "question {} needs at least one correct alternative",
                            info.id
                        ),
                    }
                    .into());
                }
            }
            Question::Text { info, answer } | Question::Number { info, answer } => {
                if answer.trim().is_empty() {
                    return Err(QuizError::InvalidAnswer {
                        reason: format!("question {} has an empty answer", info.id),
                    }
                    .into());
                }
            }
            Question::TrueFalse { .. } => {}
        }

        crate::utils::ensure_finite(self.rating(), "question rating")?;
        Ok(())
    }

    /// Grade a submission
    pub fn grade(&self, raw: &RawAnswer) -> crate::error::Result<Feedback> {
        let answered_correct = match (self, raw) {
            (Question::TrueFalse { answer, .. }, RawAnswer::Bool(given)) => answer == given,
            (Question::TrueFalse { answer, .. }, RawAnswer::Text(given)) => {
                let given: bool = given
                    .trim()
                    .to_lowercase()
                    .parse()
                    .map_err(|_| invalid_answer(format!("'{}' is not true or false", given)))?;
                *answer == given
            }
            (Question::MultipleChoice { options, .. }, RawAnswer::Choice(index)) => options
                .get(*index)
                .map(|option| option.correct)
                .ok_or_else(|| {
                    invalid_answer(format!(
                        "choice {} is out of range for {} alternatives",
                        index,
                        options.len()
                    ))
                })?,
            (Question::Number { answer, .. }, RawAnswer::Text(given)) => {
                if given.trim().is_empty() {
                    return Err(invalid_answer("empty numeric answer"));
                }
                numerals_match(answer, given)
            }
            (Question::Text { answer, .. }, RawAnswer::Text(given)) => text_matches(answer, given),
            (question, raw) => {
                return Err(invalid_answer(format!(
                    "{:?} cannot answer a {} question",
                    raw,
                    question.kind_name()
                )))
            }
        };

        Ok(Feedback {
            question_id: self.id(),
            answered_correct,
            correct_answer: self.correct_answer(),
        })
    }
}
