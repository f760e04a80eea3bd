//! Append-only answer log
//!
//! Ordering is by an explicit sequence number, never by wall-clock time.
//! Every view returned here is most-recent-first.

use crate::error::QuizError;
use crate::types::{Answer, AnswerKind, NewAnswer, PlayerId, QuestionId, TopicId};
use crate::utils::{current_timestamp, generate_answer_id};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::{debug, info};

/// How many recently answered questions a player may pick from when reporting
pub const REPORTABLE_AMOUNT: usize = 2;

/// Trait for answer log operations
pub trait AnswerHistory: Send + Sync {
    /// Append an answer, assigning the next sequence number
    fn append(&self, answer: NewAnswer) -> crate::error::Result<Answer>;

    /// Insert a record whose sequence was assigned by the caller. The
    /// sequence must be greater than every earlier one for that player.
    fn insert(&self, answer: Answer) -> crate::error::Result<()>;

    /// Remove a record appended by this log, identified by its id. Used to
    /// undo an append whose paired rating write failed.
    fn retract(&self, answer: &Answer) -> crate::error::Result<()>;

    /// Every answer of a player, most recent first
    fn answers_for(&self, player_id: &PlayerId) -> crate::error::Result<Vec<Answer>>;

    /// Questions of the last `n` answers, report-skips included
    fn last_answered(
        &self,
        player_id: &PlayerId,
        n: usize,
    ) -> crate::error::Result<Vec<QuestionId>> {
        Ok(self
            .answers_for(player_id)?
            .into_iter()
            .take(n)
            .map(|answer| answer.question_id)
            .collect())
    }

    /// Graded answers on the given topics, report-skips excluded
    fn filtered_history(
        &self,
        player_id: &PlayerId,
        topics: &HashSet<TopicId>,
    ) -> crate::error::Result<Vec<Answer>> {
        Ok(self
            .answers_for(player_id)?
            .into_iter()
            .filter(|answer| !answer.is_report_skip() && topics.contains(&answer.topic_id))
            .collect())
    }

    /// Up to `amount` distinct questions the player answered most recently
    fn recently_reportable(
        &self,
        player_id: &PlayerId,
        amount: usize,
    ) -> crate::error::Result<Vec<QuestionId>> {
        let mut seen = HashSet::new();
        Ok(self
            .answers_for(player_id)?
            .into_iter()
            .filter(|answer| !answer.is_report_skip())
            .map(|answer| answer.question_id)
            .filter(|question_id| seen.insert(*question_id))
            .take(amount)
            .collect())
    }

    /// Write the synthetic record that keeps a reported question from being
    /// served again right away
    fn record_report_skip(
        &self,
        player_id: &PlayerId,
        question_id: QuestionId,
        topic_id: TopicId,
    ) -> crate::error::Result<Answer> {
        let answer = self.append(NewAnswer {
            player_id: player_id.clone(),
            question_id,
            topic_id,
            correct: false,
            kind: AnswerKind::ReportSkip,
        })?;
        info!(
            player_id = %player_id,
            question_id,
            sequence = answer.sequence,
            "Recorded report-skip answer"
        );
        Ok(answer)
    }
}

#[derive(Debug, Default)]
struct LogState {
    /// Ascending by sequence per player
    answers: HashMap<PlayerId, Vec<Answer>>,
    next_sequence: u64,
}

/// In-memory answer log implementation
#[derive(Debug, Default)]
pub struct InMemoryAnswerLog {
    state: RwLock<LogState>,
}

impl InMemoryAnswerLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all players
    pub fn len(&self) -> crate::error::Result<usize> {
        let state = self.read_state()?;
        Ok(state.answers.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> crate::error::Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read_state(&self) -> crate::error::Result<std::sync::RwLockReadGuard<'_, LogState>> {
        self.state.read().map_err(|_| {
            QuizError::InternalError {
                message: "Failed to acquire answer log read lock".to_string(),
            }
            .into()
        })
    }

    fn write_state(&self) -> crate::error::Result<std::sync::RwLockWriteGuard<'_, LogState>> {
        self.state.write().map_err(|_| {
            QuizError::InternalError {
                message: "Failed to acquire answer log write lock".to_string(),
            }
            .into()
        })
    }
}

impl AnswerHistory for InMemoryAnswerLog {
    fn append(&self, answer: NewAnswer) -> crate::error::Result<Answer> {
        let mut state = self.write_state()?;

        state.next_sequence += 1;
        let record = Answer {
            id: generate_answer_id(),
            sequence: state.next_sequence,
            player_id: answer.player_id,
            question_id: answer.question_id,
            topic_id: answer.topic_id,
            correct: answer.correct,
            kind: answer.kind,
            answered_at: current_timestamp(),
        };

        debug!(
            player_id = %record.player_id,
            question_id = record.question_id,
            sequence = record.sequence,
            "Appended answer"
        );

        state
            .answers
            .entry(record.player_id.clone())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    fn insert(&self, answer: Answer) -> crate::error::Result<()> {
        let mut state = self.write_state()?;

        let last_sequence = state
            .answers
            .get(&answer.player_id)
            .and_then(|answers| answers.last())
            .map(|last| last.sequence);

        if let Some(last_sequence) = last_sequence {
            if answer.sequence <= last_sequence {
                return Err(QuizError::OutOfOrderAnswer {
                    player_id: answer.player_id,
                    sequence: answer.sequence,
                    last_sequence,
                }
                .into());
            }
        }

        state.next_sequence = state.next_sequence.max(answer.sequence);
        state
            .answers
            .entry(answer.player_id.clone())
            .or_default()
            .push(answer);

        Ok(())
    }

    fn retract(&self, answer: &Answer) -> crate::error::Result<()> {
        let mut state = self.write_state()?;

        let answers = state.answers.get_mut(&answer.player_id);
        let position = answers
            .as_ref()
            .and_then(|answers| answers.iter().rposition(|record| record.id == answer.id));

        match (answers, position) {
            (Some(answers), Some(position)) => {
                answers.remove(position);
                debug!(
                    player_id = %answer.player_id,
                    sequence = answer.sequence,
                    "Retracted answer"
                );
                Ok(())
            }
            _ => Err(QuizError::InternalError {
                message: format!(
                    "Answer {} for player {} is not in the log",
                    answer.sequence, answer.player_id
                ),
            }
            .into()),
        }
    }

    fn answers_for(&self, player_id: &PlayerId) -> crate::error::Result<Vec<Answer>> {
        let state = self.read_state()?;

        Ok(state
            .answers
            .get(player_id)
            .map(|answers| answers.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}
