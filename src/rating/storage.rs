//! Rating storage interface and implementations
//!
//! Ratings are keyed by (player, subject) or by question. The store is the
//! only place ratings are persisted; first access initialises a key to the
//! caller-supplied default.

use crate::error::QuizError;
use crate::types::RatingKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage entry for a rating with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub key: RatingKey,
    pub rating: f64,
    /// Number of applied updates, capped answers excluded
    pub updates: u64,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RatingEntry {
    pub fn new(key: RatingKey, initial_rating: f64) -> Self {
        let now = Utc::now();
        Self {
            key,
            rating: initial_rating,
            updates: 0,
            last_updated: now,
            created_at: now,
        }
    }

    /// Update the rating and increment the update counter
    pub fn update_rating(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.updates += 1;
        self.last_updated = Utc::now();
    }
}

/// Trait for rating storage operations
pub trait RatingStore: Send + Sync {
    /// Get a rating entry if one exists
    fn get_rating(&self, key: &RatingKey) -> crate::error::Result<Option<RatingEntry>>;

    /// Get a rating entry, creating it with `default_rating` on first access
    fn get_or_init(&self, key: &RatingKey, default_rating: f64)
        -> crate::error::Result<RatingEntry>;

    /// Store or replace a rating entry
    fn store_rating(&self, entry: RatingEntry) -> crate::error::Result<()>;

    /// Store several entries atomically
    fn store_ratings(&self, entries: Vec<RatingEntry>) -> crate::error::Result<()>;

    /// Get existing entries for several keys; missing keys are omitted
    fn get_ratings(
        &self,
        keys: &[RatingKey],
    ) -> crate::error::Result<HashMap<RatingKey, RatingEntry>>;

    /// Get every stored rating (for admin/debugging)
    fn get_all_ratings(&self) -> crate::error::Result<HashMap<RatingKey, RatingEntry>>;

    /// Get total number of stored ratings
    fn get_rating_count(&self) -> crate::error::Result<usize>;
}

fn lock_error(kind: &str) -> QuizError {
    QuizError::InternalError {
        message: format!("Failed to acquire ratings {} lock", kind),
    }
}

/// In-memory rating storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    ratings: RwLock<HashMap<RatingKey, RatingEntry>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RatingStore for InMemoryRatingStore {
    fn get_rating(&self, key: &RatingKey) -> crate::error::Result<Option<RatingEntry>> {
        let ratings = self.ratings.read().map_err(|_| lock_error("read"))?;

        Ok(ratings.get(key).cloned())
    }

    fn get_or_init(
        &self,
        key: &RatingKey,
        default_rating: f64,
    ) -> crate::error::Result<RatingEntry> {
        if let Some(entry) = self.get_rating(key)? {
            return Ok(entry);
        }

        let mut ratings = self.ratings.write().map_err(|_| lock_error("write"))?;

        // Another writer may have initialised the key between the two locks
        let entry = ratings
            .entry(key.clone())
            .or_insert_with(|| RatingEntry::new(key.clone(), default_rating));

        Ok(entry.clone())
    }

    fn store_rating(&self, entry: RatingEntry) -> crate::error::Result<()> {
        let mut ratings = self.ratings.write().map_err(|_| lock_error("write"))?;

        ratings.insert(entry.key.clone(), entry);
        Ok(())
    }

    fn store_ratings(&self, entries: Vec<RatingEntry>) -> crate::error::Result<()> {
        let mut ratings = self.ratings.write().map_err(|_| lock_error("write"))?;

        for entry in entries {
            ratings.insert(entry.key.clone(), entry);
        }

        Ok(())
    }

    fn get_ratings(
        &self,
        keys: &[RatingKey],
    ) -> crate::error::Result<HashMap<RatingKey, RatingEntry>> {
        let ratings = self.ratings.read().map_err(|_| lock_error("read"))?;

        let mut result = HashMap::new();
        for key in keys {
            if let Some(entry) = ratings.get(key) {
                result.insert(key.clone(), entry.clone());
            }
        }

        Ok(result)
    }

    fn get_all_ratings(&self) -> crate::error::Result<HashMap<RatingKey, RatingEntry>> {
        let ratings = self.ratings.read().map_err(|_| lock_error("read"))?;

        Ok(ratings.clone())
    }

    fn get_rating_count(&self) -> crate::error::Result<usize> {
        let ratings = self.ratings.read().map_err(|_| lock_error("read"))?;

        Ok(ratings.len())
    }
}
