//! Quiz engine
//!
//! This module provides the [`QuizEngine`] that the surrounding application
//! calls into for answering, next-question requests and content reports.

pub mod locks;
pub mod manager;

pub use locks::EntityLocks;
pub use manager::{AnswerOutcome, EngineStats, QuizEngine, RecordedAnswer};
