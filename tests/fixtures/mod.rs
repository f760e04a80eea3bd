//! Test fixtures shared by the integration test binaries

#![allow(dead_code)]

use quiz_ladder::catalog::InMemoryCatalog;
use quiz_ladder::config::AppConfig;
use quiz_ladder::engine::QuizEngine;
use quiz_ladder::history::{AnswerHistory, InMemoryAnswerLog};
use quiz_ladder::question::{ChoiceOption, Question, QuestionInfo};
use quiz_ladder::rating::{InMemoryRatingStore, RatingEntry, RatingStore};
use quiz_ladder::types::{
    Answer, NewAnswer, PlayerId, QuestionId, RatingKey, Subject, SubjectId, Topic, TopicId,
};
use std::collections::HashMap;
use std::sync::Arc;

pub const MATH: SubjectId = 1;
pub const PHYSICS: SubjectId = 2;

pub const ARITHMETIC: TopicId = 10;
pub const GEOMETRY: TopicId = 11;
pub const MECHANICS: TopicId = 20;

/// Everything a test might want to poke at directly
pub struct TestSystem {
    pub engine: QuizEngine,
    pub catalog: Arc<InMemoryCatalog>,
    pub ratings: Arc<InMemoryRatingStore>,
    pub history: Arc<InMemoryAnswerLog>,
}

pub fn info(id: QuestionId, topic_id: TopicId, rating: f64) -> QuestionInfo {
    QuestionInfo {
        id,
        topic_id,
        text: format!("Question {}", id),
        rating,
        creator: None,
    }
}

/// A true/false question whose answer is `true`
pub fn true_false(id: QuestionId, topic_id: TopicId, rating: f64) -> Question {
    Question::TrueFalse {
        info: info(id, topic_id, rating),
        answer: true,
    }
}

pub fn number(id: QuestionId, topic_id: TopicId, rating: f64, answer: &str) -> Question {
    Question::Number {
        info: info(id, topic_id, rating),
        answer: answer.to_string(),
    }
}

pub fn multiple_choice(id: QuestionId, topic_id: TopicId, rating: f64) -> Question {
    Question::MultipleChoice {
        info: info(id, topic_id, rating),
        options: vec![
            ChoiceOption {
                text: "wrong".to_string(),
                correct: false,
            },
            ChoiceOption {
                text: "right".to_string(),
                correct: true,
            },
        ],
    }
}

/// Catalog with two subjects and three topics, plus the given questions
pub fn create_test_catalog(questions: Vec<Question>) -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();

    catalog
        .add_subject(Subject {
            id: MATH,
            title: "Mathematics".to_string(),
            code: "MA".to_string(),
        })
        .unwrap();
    catalog
        .add_subject(Subject {
            id: PHYSICS,
            title: "Physics".to_string(),
            code: "PH".to_string(),
        })
        .unwrap();

    for (id, subject_id, title) in [
        (ARITHMETIC, MATH, "Arithmetic"),
        (GEOMETRY, MATH, "Geometry"),
        (MECHANICS, PHYSICS, "Mechanics"),
    ] {
        catalog
            .add_topic(Topic {
                id,
                subject_id,
                title: title.to_string(),
            })
            .unwrap();
    }

    for question in questions {
        catalog.add_question(question).unwrap();
    }

    catalog
}

/// Engine over in-memory collaborators with default configuration
pub fn create_test_system(questions: Vec<Question>) -> TestSystem {
    let catalog = Arc::new(create_test_catalog(questions));
    let ratings = Arc::new(InMemoryRatingStore::new());
    let history = Arc::new(InMemoryAnswerLog::new());

    let engine = QuizEngine::new(
        catalog.clone(),
        ratings.clone(),
        history.clone(),
        &AppConfig::default(),
    )
    .unwrap();

    TestSystem {
        engine,
        catalog,
        ratings,
        history,
    }
}

/// `count` arithmetic questions with ids from 1, all rated `rating`
pub fn arithmetic_questions(count: u64, rating: f64) -> Vec<Question> {
    (1..=count)
        .map(|id| true_false(id, ARITHMETIC, rating))
        .collect()
}

mockall::mock! {
    pub Store {}

    impl RatingStore for Store {
        fn get_rating(&self, key: &RatingKey) -> quiz_ladder::Result<Option<RatingEntry>>;
        fn get_or_init(&self, key: &RatingKey, default_rating: f64) -> quiz_ladder::Result<RatingEntry>;
        fn store_rating(&self, entry: RatingEntry) -> quiz_ladder::Result<()>;
        fn store_ratings(&self, entries: Vec<RatingEntry>) -> quiz_ladder::Result<()>;
        fn get_ratings(&self, keys: &[RatingKey]) -> quiz_ladder::Result<HashMap<RatingKey, RatingEntry>>;
        fn get_all_ratings(&self) -> quiz_ladder::Result<HashMap<RatingKey, RatingEntry>>;
        fn get_rating_count(&self) -> quiz_ladder::Result<usize>;
    }
}

/// Engine over a mocked rating store and an in-memory catalog and log
pub fn create_engine_with_store(
    questions: Vec<Question>,
    store: MockStore,
) -> (QuizEngine, Arc<InMemoryAnswerLog>) {
    let catalog = Arc::new(create_test_catalog(questions));
    let history = Arc::new(InMemoryAnswerLog::new());

    let engine = QuizEngine::new(
        catalog,
        Arc::new(store),
        history.clone(),
        &AppConfig::default(),
    )
    .unwrap();

    (engine, history)
}

/// Answer log that refuses every write
pub struct FailingLog;

impl AnswerHistory for FailingLog {
    fn append(&self, _answer: NewAnswer) -> quiz_ladder::Result<Answer> {
        Err(anyhow::anyhow!("answer log unavailable"))
    }

    fn insert(&self, _answer: Answer) -> quiz_ladder::Result<()> {
        Err(anyhow::anyhow!("answer log unavailable"))
    }

    fn retract(&self, _answer: &Answer) -> quiz_ladder::Result<()> {
        Err(anyhow::anyhow!("answer log unavailable"))
    }

    fn answers_for(&self, _player_id: &PlayerId) -> quiz_ladder::Result<Vec<Answer>> {
        Ok(Vec::new())
    }
}

/// Engine over in-memory ratings and a log that rejects appends
pub fn create_engine_with_failing_log(
    questions: Vec<Question>,
) -> (QuizEngine, Arc<InMemoryRatingStore>) {
    let catalog = Arc::new(create_test_catalog(questions));
    let ratings = Arc::new(InMemoryRatingStore::new());

    let engine = QuizEngine::new(
        catalog,
        ratings.clone(),
        Arc::new(FailingLog),
        &AppConfig::default(),
    )
    .unwrap();

    (engine, ratings)
}
