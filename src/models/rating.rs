use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A reader's star rating for a single book
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rating {
    pub book_id: String,
    pub value: u8,
    pub submitted_at: DateTime<Utc>,
}

impl Rating {
    /// Creates a rating, rejecting blank ids and values outside 1..=5
    pub fn new(book_id: impl Into<String>, value: u8) -> AppResult<Self> {
        let book_id = book_id.into().trim().to_string();
        if book_id.is_empty() {
            return Err(AppError::InvalidInput(
                "Book id cannot be empty".to_string(),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, value
            )));
        }

        Ok(Self {
            book_id,
            value,
            submitted_at: Utc::now(),
        })
    }
}

/// The input fingerprint for one recommendation request.
///
/// Serializes to exactly the body expected by `POST /get-recommendations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingsSnapshot {
    /// Rated book ids in the order they were first rated
    pub user_history: Vec<String>,
    pub user_ratings: HashMap<String, u8>,
}

impl RatingsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.user_ratings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.user_ratings.len()
    }
}

/// All ratings of the current session, at most one per book
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingBook {
    ratings: Vec<Rating>,
}

impl RatingBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rating; a resubmission for the same book overwrites the old
    /// value but keeps the book's place in the history.
    pub fn submit(&mut self, rating: Rating) {
        if let Some(existing) = self
            .ratings
            .iter_mut()
            .find(|r| r.book_id == rating.book_id)
        {
            *existing = rating;
        } else {
            self.ratings.push(rating);
        }
    }

    pub fn get(&self, book_id: &str) -> Option<&Rating> {
        self.ratings.iter().find(|r| r.book_id == book_id)
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.get(book_id).is_some()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn snapshot(&self) -> RatingsSnapshot {
        RatingsSnapshot {
            user_history: self.ratings.iter().map(|r| r.book_id.clone()).collect(),
            user_ratings: self
                .ratings
                .iter()
                .map(|r| (r.book_id.clone(), r.value))
                .collect(),
        }
    }
}
