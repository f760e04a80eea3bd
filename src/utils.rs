//! Utility functions for the quiz engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique answer record ID
pub fn generate_answer_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Reject NaN and infinities before they reach rating arithmetic
pub fn ensure_finite(value: f64, what: &str) -> crate::error::Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(crate::error::QuizError::InvalidRating {
            reason: format!("{} must be finite, got {}", what, value),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_answer_id();
        let id2 = generate_answer_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(1400.0, 1200.0), 200.0);
        assert_eq!(rating_difference(1000.0, 1200.0), 200.0);
        assert_eq!(rating_difference(1200.0, 1200.0), 0.0);
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(1200.0, "rating").unwrap(), 1200.0);
        assert!(ensure_finite(f64::NAN, "rating").is_err());
        assert!(ensure_finite(f64::INFINITY, "rating").is_err());
        assert!(ensure_finite(f64::NEG_INFINITY, "rating").is_err());
    }
}
