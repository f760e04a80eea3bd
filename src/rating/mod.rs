//! Rating system for players and questions
//!
//! This module provides the Elo update applied after every graded answer,
//! the streak-adjusted virtual rating used for selection, and the storage
//! interface ratings are persisted through.

pub mod calculator;
pub mod elo;
pub mod storage;
pub mod virtual_rating;

// Re-export commonly used types
pub use calculator::{RatingUpdate, RatingUpdater};
pub use elo::{expected_score, EloConfig, EloRatingUpdater};
pub use storage::{InMemoryRatingStore, RatingEntry, RatingStore};
pub use virtual_rating::{VirtualRatingConfig, VirtualRatingEstimator};
