//! Next-question selection
//!
//! This module picks which question a player sees next, trading closeness
//! of difficulty against not repeating what was just answered.

pub mod selector;

pub use selector::{
    ClosestRatingSelector, QuestionSelector, SelectionConfig, SelectionOutcome, REPEAT,
};
