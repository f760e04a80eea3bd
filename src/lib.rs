//! Quiz Ladder - adaptive-difficulty quiz engine
//!
//! This crate tracks an Elo rating for every player (per subject) and every
//! question, and uses those ratings to pick which question a player should
//! see next so that difficulty follows ability.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod question;
pub mod rating;
pub mod selection;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{QuizError, Result};
pub use types::*;

// Re-export key components
pub use catalog::{InMemoryCatalog, QuestionCatalog};
pub use engine::QuizEngine;
pub use history::{AnswerHistory, InMemoryAnswerLog};
pub use question::{Feedback, Question, RawAnswer};
pub use rating::{EloRatingUpdater, InMemoryRatingStore, RatingStore, VirtualRatingEstimator};
pub use selection::{ClosestRatingSelector, QuestionSelector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
