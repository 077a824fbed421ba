mod book;
mod rating;

pub use book::{Book, RecommendationSet};
pub use rating::{Rating, RatingBook, RatingsSnapshot, MAX_RATING, MIN_RATING};
