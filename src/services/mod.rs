pub mod providers;
pub mod reconcile;
pub mod refresh;

pub use reconcile::{
    visible_recommendations, RecommendationView, SessionState, WishlistEntry, WishlistOrder,
};
pub use refresh::{RefreshController, RefreshPhase, RefreshState, RetryPolicy};
