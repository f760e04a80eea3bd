//! Per-entity write locks
//!
//! Each rating key gets its own async mutex so read-modify-write cycles on
//! one player-subject pair or one question never interleave, while
//! unrelated players proceed in parallel.

use crate::error::QuizError;
use crate::types::RatingKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct EntityLocks {
    locks: Mutex<HashMap<RatingKey, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, key: &RatingKey) -> crate::error::Result<Arc<AsyncMutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| QuizError::InternalError {
            message: "Failed to acquire lock registry".to_string(),
        })?;

        Ok(locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone())
    }

    /// Wait for exclusive access to one rating key
    pub async fn lock(&self, key: &RatingKey) -> crate::error::Result<OwnedMutexGuard<()>> {
        let handle = self.handle(key)?;
        Ok(handle.lock_owned().await)
    }

    /// Forget the mutex for `key` once nobody holds or waits on it. Call
    /// after dropping the guard.
    pub fn release(&self, key: &RatingKey) -> crate::error::Result<()> {
        let mut locks = self.locks.lock().map_err(|_| QuizError::InternalError {
            message: "Failed to acquire lock registry".to_string(),
        })?;

        // The registry's own handle is the only one left
        if locks
            .get(key)
            .is_some_and(|handle| Arc::strong_count(handle) == 1)
        {
            locks.remove(key);
        }
        Ok(())
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
