use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Ratings
        .route("/ratings", get(handlers::get_ratings))
        .route("/ratings", post(handlers::submit_rating))
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        .route("/recommendations/refresh", post(handlers::refresh_recommendations))
        .route("/dismissed", get(handlers::get_dismissed))
        .route("/dismissed", post(handlers::dismiss_book))
        // Wishlist
        .route("/wishlist", get(handlers::get_wishlist))
        .route("/wishlist", post(handlers::add_to_wishlist))
        .route("/wishlist/reorder", put(handlers::reorder_wishlist))
        .route("/wishlist/:book_id", delete(handlers::remove_from_wishlist))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}
