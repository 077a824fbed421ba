use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::{
    providers::RecommendationApi, RefreshController, RetryPolicy, SessionState,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: RefreshController,
    /// Ratings, dismissals and wishlist of the reader session
    pub session: Arc<RwLock<SessionState>>,
}

impl AppState {
    /// Creates an empty session backed by `api`
    pub fn new(api: Arc<dyn RecommendationApi>, policy: RetryPolicy) -> Self {
        Self {
            controller: RefreshController::new(api, policy),
            session: Arc::new(RwLock::new(SessionState::new())),
        }
    }
}
