//! Quiz engine orchestration
//!
//! [`QuizEngine`] wires the catalog, rating store, answer log, Elo updater
//! and selector together: it grades and records answers, serves the next
//! question, and handles content reports.

use crate::catalog::QuestionCatalog;
use crate::config::AppConfig;
use crate::engine::locks::EntityLocks;
use crate::error::{QuizError, Result};
use crate::history::AnswerHistory;
use crate::metrics::MetricsCollector;
use crate::question::{Feedback, Question, RawAnswer};
use crate::rating::calculator::RatingUpdater;
use crate::rating::elo::EloRatingUpdater;
use crate::rating::storage::RatingStore;
use crate::rating::virtual_rating::VirtualRatingEstimator;
use crate::selection::{ClosestRatingSelector, QuestionSelector, SelectionOutcome};
use crate::types::{
    Answer, AnswerKind, NewAnswer, PlayerId, QuestionId, RatingChange, RatingKey, SubjectId,
    TopicId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

/// Statistics about engine operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Graded answers recorded
    pub answers_recorded: u64,
    /// Answers that moved ratings
    pub rating_updates_applied: u64,
    /// Answers the rating cap kept from moving ratings
    pub rating_updates_suppressed: u64,
    /// Questions handed out by `next_question`
    pub questions_served: u64,
    /// Selections that had to re-serve a recent question
    pub fallback_selections: u64,
    /// Report-skip records written
    pub report_skips: u64,
}

/// A graded answer and everything it changed
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAnswer {
    pub answer: Answer,
    pub rating_change: RatingChange,
}

/// Result of `submit_answer`
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub feedback: Feedback,
    pub recorded: RecordedAnswer,
}

/// The adaptive quiz engine
#[derive(Clone)]
pub struct QuizEngine {
    /// Subjects, topics and questions
    catalog: Arc<dyn QuestionCatalog>,
    /// Persisted player and question ratings
    ratings: Arc<dyn RatingStore>,
    /// Append-only answer log
    history: Arc<dyn AnswerHistory>,
    /// Elo updater applied after each graded answer
    updater: Arc<dyn RatingUpdater>,
    /// Streak adjustment for selection
    estimator: VirtualRatingEstimator,
    /// Next-question strategy
    selector: Arc<dyn QuestionSelector>,
    /// Topics each player has selected
    subscriptions: Arc<RwLock<HashMap<PlayerId, HashSet<TopicId>>>>,
    /// Serialises rating writes per entity
    locks: Arc<EntityLocks>,
    metrics_collector: Arc<MetricsCollector>,
    stats: Arc<RwLock<EngineStats>>,
    repeat_window: usize,
    reportable_amount: usize,
}

impl QuizEngine {
    /// Create an engine with the Elo updater and closest-rating selector
    /// built from `config`
    pub fn new(
        catalog: Arc<dyn QuestionCatalog>,
        ratings: Arc<dyn RatingStore>,
        history: Arc<dyn AnswerHistory>,
        config: &AppConfig,
    ) -> Result<Self> {
        let updater = Arc::new(EloRatingUpdater::new((&config.rating).into())?);
        let selector = Arc::new(ClosestRatingSelector::new((&config.selection).into()));
        let metrics_collector = Arc::new(MetricsCollector::new()?);

        Ok(Self::with_components(
            catalog,
            ratings,
            history,
            updater,
            selector,
            metrics_collector,
            config,
        ))
    }

    /// Create an engine from explicit components
    pub fn with_components(
        catalog: Arc<dyn QuestionCatalog>,
        ratings: Arc<dyn RatingStore>,
        history: Arc<dyn AnswerHistory>,
        updater: Arc<dyn RatingUpdater>,
        selector: Arc<dyn QuestionSelector>,
        metrics_collector: Arc<MetricsCollector>,
        config: &AppConfig,
    ) -> Self {
        Self {
            catalog,
            ratings,
            history,
            updater,
            estimator: VirtualRatingEstimator::new((&config.selection).into()),
            selector,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            locks: Arc::new(EntityLocks::new()),
            metrics_collector,
            stats: Arc::new(RwLock::new(EngineStats::default())),
            repeat_window: config.selection.repeat_window,
            reportable_amount: config.selection.reportable_amount,
        }
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    /// Snapshot of the engine counters
    pub fn stats(&self) -> Result<EngineStats> {
        let stats = self.stats.read().map_err(|_| QuizError::InternalError {
            message: "Failed to acquire stats read lock".to_string(),
        })?;
        Ok(stats.clone())
    }

    fn write_stats(&self) -> Result<RwLockWriteGuard<'_, EngineStats>> {
        self.stats.write().map_err(|_| {
            QuizError::InternalError {
                message: "Failed to acquire stats write lock".to_string(),
            }
            .into()
        })
    }

    /// Replace a player's selected topics
    pub async fn subscribe_topics(
        &self,
        player_id: &PlayerId,
        topics: impl IntoIterator<Item = TopicId>,
    ) -> Result<()> {
        let topics: HashSet<TopicId> = topics.into_iter().collect();
        for topic_id in &topics {
            if self.catalog.topic(*topic_id).await?.is_none() {
                return Err(QuizError::TopicNotFound {
                    topic_id: *topic_id,
                }
                .into());
            }
        }

        info!(player_id = %player_id, topics = topics.len(), "Updated topic selection");

        let mut subscriptions = self.subscriptions.write().map_err(|_| QuizError::InternalError {
            message: "Failed to acquire subscriptions write lock".to_string(),
        })?;
        subscriptions.insert(player_id.clone(), topics);
        Ok(())
    }

    /// Topics the player has selected, across all subjects
    pub fn subscribed_topics(&self, player_id: &PlayerId) -> Result<HashSet<TopicId>> {
        let subscriptions = self.subscriptions.read().map_err(|_| QuizError::InternalError {
            message: "Failed to acquire subscriptions read lock".to_string(),
        })?;

        Ok(subscriptions.get(player_id).cloned().unwrap_or_default())
    }

    /// Selected topics that belong to `subject_id`
    async fn subject_topics(
        &self,
        player_id: &PlayerId,
        subject_id: SubjectId,
    ) -> Result<HashSet<TopicId>> {
        let selected = self.subscribed_topics(player_id)?;
        if selected.is_empty() {
            return Err(QuizError::NoTopicsSelected {
                player_id: player_id.clone(),
            }
            .into());
        }

        let topics: HashSet<TopicId> = self
            .catalog
            .topics_in_subject(subject_id)
            .await?
            .into_iter()
            .map(|topic| topic.id)
            .filter(|topic_id| selected.contains(topic_id))
            .collect();

        if topics.is_empty() {
            return Err(QuizError::NoTopicsSelected {
                player_id: player_id.clone(),
            }
            .into());
        }

        Ok(topics)
    }

    async fn find_question(&self, question_id: QuestionId) -> Result<Question> {
        self.catalog
            .question(question_id)
            .await?
            .ok_or_else(|| QuizError::QuestionNotFound { question_id }.into())
    }

    async fn subject_of(&self, question: &Question) -> Result<SubjectId> {
        let topic_id = question.topic_id();
        let topic = self
            .catalog
            .topic(topic_id)
            .await?
            .ok_or(QuizError::TopicNotFound { topic_id })?;
        Ok(topic.subject_id)
    }

    /// The player's stored rating in a subject, without creating it
    pub fn player_rating(&self, player_id: &PlayerId, subject_id: SubjectId) -> Result<f64> {
        let key = RatingKey::player(player_id.clone(), subject_id);
        Ok(self
            .ratings
            .get_rating(&key)?
            .map(|entry| entry.rating)
            .unwrap_or_else(|| self.updater.initial_rating()))
    }

    /// The question's stored rating, or its starting rating if never answered
    pub async fn question_rating(&self, question_id: QuestionId) -> Result<f64> {
        let question = self.find_question(question_id).await?;
        Ok(self
            .ratings
            .get_rating(&RatingKey::question(question_id))?
            .map(|entry| entry.rating)
            .unwrap_or_else(|| question.rating()))
    }

    /// Grade a raw submission, then record it
    pub async fn submit_answer(
        &self,
        player_id: &PlayerId,
        question_id: QuestionId,
        raw: &RawAnswer,
    ) -> Result<AnswerOutcome> {
        let question = self.find_question(question_id).await?;
        let feedback = question.grade(raw)?;
        let recorded = self
            .record_graded(player_id, &question, feedback.answered_correct)
            .await?;

        Ok(AnswerOutcome { feedback, recorded })
    }

    /// Record an answer graded elsewhere
    pub async fn record_outcome(
        &self,
        player_id: &PlayerId,
        question_id: QuestionId,
        correct: bool,
    ) -> Result<RecordedAnswer> {
        let question = self.find_question(question_id).await?;
        self.record_graded(player_id, &question, correct).await
    }

    async fn record_graded(
        &self,
        player_id: &PlayerId,
        question: &Question,
        correct: bool,
    ) -> Result<RecordedAnswer> {
        let timer = self.metrics_collector.start_timer();
        let subject_id = self.subject_of(question).await?;
        let player_key = RatingKey::player(player_id.clone(), subject_id);
        let question_key = RatingKey::question(question.id());

        // Always player first, then question
        let player_guard = self.locks.lock(&player_key).await?;
        let question_guard = self.locks.lock(&question_key).await?;

        let result = self.commit_answer(player_id, question, correct, &player_key, &question_key);

        drop(question_guard);
        drop(player_guard);
        for key in [&question_key, &player_key] {
            if let Err(e) = self.locks.release(key) {
                warn!(key = %key, "Failed to release entity lock: {}", e);
            }
        }

        let recorded = result?;
        self.metrics_collector.record_answer(
            correct,
            recorded.rating_change.applied,
            timer.stop(),
        );
        Ok(recorded)
    }

    /// Update both ratings and append the answer as one unit. Runs with the
    /// player and question locks held.
    fn commit_answer(
        &self,
        player_id: &PlayerId,
        question: &Question,
        correct: bool,
        player_key: &RatingKey,
        question_key: &RatingKey,
    ) -> Result<RecordedAnswer> {
        let mut player_entry = self
            .ratings
            .get_or_init(player_key, self.updater.initial_rating())?;
        let mut question_entry = self.ratings.get_or_init(question_key, question.rating())?;

        let update = self
            .updater
            .update(player_entry.rating, question_entry.rating, correct)?;

        let rating_change = RatingChange {
            player_id: player_id.clone(),
            question_id: question.id(),
            old_player_rating: player_entry.rating,
            new_player_rating: update.player_rating,
            old_question_rating: question_entry.rating,
            new_question_rating: update.question_rating,
            applied: update.applied,
        };

        // Taken before any write so a poisoned lock leaves nothing committed
        let mut stats = self.write_stats()?;

        // Recorded even when the cap suppresses the update
        let answer = self.history.append(NewAnswer {
            player_id: player_id.clone(),
            question_id: question.id(),
            topic_id: question.topic_id(),
            correct,
            kind: AnswerKind::Graded,
        })?;

        if update.applied {
            player_entry.update_rating(update.player_rating);
            question_entry.update_rating(update.question_rating);
            if let Err(e) = self
                .ratings
                .store_ratings(vec![player_entry, question_entry])
            {
                if let Err(retract_error) = self.history.retract(&answer) {
                    error!(
                        player_id = %player_id,
                        sequence = answer.sequence,
                        "Rating write failed and the answer could not be retracted: {}",
                        retract_error
                    );
                }
                return Err(e);
            }
        } else {
            info!(
                player_id = %player_id,
                question_id = question.id(),
                player_rating = rating_change.old_player_rating,
                question_rating = rating_change.old_question_rating,
                "Rating cap reached, ratings unchanged"
            );
        }

        stats.answers_recorded += 1;
        if update.applied {
            stats.rating_updates_applied += 1;
        } else {
            stats.rating_updates_suppressed += 1;
        }

        debug!(
            player_id = %player_id,
            question_id = question.id(),
            correct,
            player_delta = rating_change.player_delta(),
            question_delta = rating_change.question_delta(),
            sequence = answer.sequence,
            "Recorded answer"
        );

        Ok(RecordedAnswer {
            answer,
            rating_change,
        })
    }

    /// The player's streak-adjusted rating for a subject
    pub async fn virtual_rating(&self, player_id: &PlayerId, subject_id: SubjectId) -> Result<f64> {
        let topics = self.subject_topics(player_id, subject_id).await?;
        self.virtual_rating_for_topics(player_id, subject_id, &topics)
    }

    fn virtual_rating_for_topics(
        &self,
        player_id: &PlayerId,
        subject_id: SubjectId,
        topics: &HashSet<TopicId>,
    ) -> Result<f64> {
        let base_rating = self.player_rating(player_id, subject_id)?;
        let recent = self.history.filtered_history(player_id, topics)?;
        Ok(self.estimator.virtual_rating(base_rating, &recent))
    }

    /// Choose the next question, reporting how it was chosen
    pub async fn next_selection(
        &self,
        player_id: &PlayerId,
        subject_id: SubjectId,
    ) -> Result<SelectionOutcome> {
        let result = self.select(player_id, subject_id).await;

        match &result {
            Ok(outcome) => {
                self.metrics_collector.record_selection(outcome.fallback);
                let mut stats = self.write_stats()?;
                stats.questions_served += 1;
                if outcome.fallback {
                    stats.fallback_selections += 1;
                }
            }
            Err(e) => {
                let reason = e
                    .downcast_ref::<QuizError>()
                    .map(QuizError::reason)
                    .unwrap_or("other");
                warn!(player_id = %player_id, subject_id, reason, "Question selection failed: {}", e);
                self.metrics_collector.record_selection_error(reason);
            }
        }

        result
    }

    /// Choose the next question for a player in a subject
    pub async fn next_question(
        &self,
        player_id: &PlayerId,
        subject_id: SubjectId,
    ) -> Result<Question> {
        Ok(self.next_selection(player_id, subject_id).await?.question)
    }

    async fn select(&self, player_id: &PlayerId, subject_id: SubjectId) -> Result<SelectionOutcome> {
        let topics = self.subject_topics(player_id, subject_id).await?;
        let virtual_rating = self.virtual_rating_for_topics(player_id, subject_id, &topics)?;

        let candidates = self.catalog.questions_in_topics(&topics).await?;
        let keys: Vec<RatingKey> = candidates
            .iter()
            .map(|question| RatingKey::question(question.id()))
            .collect();
        // Selection tolerates stale ratings, so no entity locks here
        let stored = self.ratings.get_ratings(&keys)?;
        let pool: Vec<Question> = candidates
            .into_iter()
            .map(|question| match stored.get(&RatingKey::question(question.id())) {
                Some(entry) => question.with_rating(entry.rating),
                None => question,
            })
            .collect();

        let recent = self.history.last_answered(player_id, self.repeat_window)?;
        let outcome = self.selector.select_next(&pool, virtual_rating, &recent)?;

        debug!(
            player_id = %player_id,
            subject_id,
            virtual_rating,
            question_id = outcome.question.id(),
            fallback = outcome.fallback,
            "Selected next question"
        );

        Ok(outcome)
    }

    /// Flag a question; it will not be served again right away and the
    /// report does not count toward the player's streak
    pub async fn report_question(
        &self,
        player_id: &PlayerId,
        question_id: QuestionId,
    ) -> Result<Answer> {
        let question = self.find_question(question_id).await?;
        let mut stats = self.write_stats()?;
        let answer = self
            .history
            .record_report_skip(player_id, question_id, question.topic_id())?;
        stats.report_skips += 1;

        self.metrics_collector.record_report_skip();

        Ok(answer)
    }

    /// Recently answered questions the player may report
    pub async fn reportable_questions(&self, player_id: &PlayerId) -> Result<Vec<Question>> {
        let ids = self
            .history
            .recently_reportable(player_id, self.reportable_amount)?;

        let mut questions = Vec::with_capacity(ids.len());
        for question_id in ids {
            match self.catalog.question(question_id).await? {
                Some(question) => questions.push(question),
                None => warn!(question_id, "Answered question no longer in catalog"),
            }
        }
        Ok(questions)
    }

    /// The player's full answer log, most recent first
    pub fn answer_history(&self, player_id: &PlayerId) -> Result<Vec<Answer>> {
        self.history.answers_for(player_id)
    }
}
