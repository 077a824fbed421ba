/// Recommendation API abstraction
///
/// The recommendation engine itself lives in a separate service. This module
/// defines the seam the refresh controller talks through, so the HTTP client
/// can be swapped for a stub in tests.
use crate::{
    error::AppResult,
    models::{Book, RatingsSnapshot},
};

pub mod http_api;

pub use http_api::HttpRecommendationApi;

/// Trait for recommendation sources
///
/// One call is one attempt: implementations must not retry internally, the
/// refresh controller owns the retry ladder.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationApi: Send + Sync {
    /// Fetch recommendations for a ratings snapshot
    ///
    /// Returns the valid entries of the response in the order the API sent
    /// them. Malformed entries are dropped; a malformed response as a whole
    /// is an error.
    async fn get_recommendations(&self, snapshot: &RatingsSnapshot) -> AppResult<Vec<Book>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
