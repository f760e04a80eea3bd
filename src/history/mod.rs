//! Answer history tracking
//!
//! This module keeps each player's append-only answer log and exposes the
//! read views the rest of the engine needs: the repeat-avoidance window, the
//! topic-filtered streak history, and the recently reportable questions.

pub mod log;

pub use log::{AnswerHistory, InMemoryAnswerLog, REPORTABLE_AMOUNT};
