use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::Rating;
use crate::services::{
    visible_recommendations, RecommendationView, RefreshPhase, WishlistEntry, WishlistOrder,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub book_id: String,
    /// Wide integer so out-of-range values get a 400 instead of a decode error
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RatingAcceptedResponse {
    pub rating: Rating,
    /// Generation of the refresh cycle this rating started
    pub generation: u64,
}

#[derive(Debug, Serialize)]
pub struct RefreshAcceptedResponse {
    pub generation: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub generation: u64,
    pub phase: RefreshPhase,
    pub error: Option<String>,
    pub recommendations: Vec<RecommendationView>,
}

#[derive(Debug, Deserialize)]
pub struct BookIdRequest {
    pub book_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub book_id: String,
    pub notes: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Get all ratings of the session
pub async fn get_ratings(State(state): State<AppState>) -> Json<Vec<Rating>> {
    let session = state.session.read().await;
    Json(session.ratings.ratings().to_vec())
}

/// Record a rating and refresh recommendations for the new snapshot
pub async fn submit_rating(
    State(state): State<AppState>,
    Json(request): Json<SubmitRatingRequest>,
) -> AppResult<(StatusCode, Json<RatingAcceptedResponse>)> {
    let value = u8::try_from(request.rating).map_err(|_| {
        AppError::InvalidInput(format!("Rating must be between 1 and 5, got {}", request.rating))
    })?;
    let rating = Rating::new(request.book_id, value)?;

    // Trigger under the lock so trigger order matches snapshot order
    let mut session = state.session.write().await;
    session.ratings.submit(rating.clone());
    let generation = state.controller.trigger(session.ratings.snapshot());

    tracing::info!(
        book_id = %rating.book_id,
        rating = rating.value,
        generation,
        "Rating submitted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(RatingAcceptedResponse { rating, generation }),
    ))
}

/// Start a refresh for the current snapshot (initial page load)
pub async fn refresh_recommendations(
    State(state): State<AppState>,
) -> (StatusCode, Json<RefreshAcceptedResponse>) {
    let session = state.session.write().await;
    let generation = state.controller.trigger(session.ratings.snapshot());
    (StatusCode::ACCEPTED, Json(RefreshAcceptedResponse { generation }))
}

/// Current refresh state and the recommendations visible to the reader
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Json<RecommendationsResponse> {
    let refresh = state.controller.state();
    let session = state.session.read().await;

    let recommendations = visible_recommendations(
        &refresh.recommendations,
        &session,
        query.category.as_deref(),
    );

    Json(RecommendationsResponse {
        generation: refresh.generation,
        phase: refresh.phase,
        error: refresh.error,
        recommendations,
    })
}

/// Hide a book from the recommendations
pub async fn dismiss_book(
    State(state): State<AppState>,
    Json(request): Json<BookIdRequest>,
) -> AppResult<StatusCode> {
    let mut session = state.session.write().await;
    session.dismiss(&request.book_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List dismissed book ids
pub async fn get_dismissed(State(state): State<AppState>) -> Json<Vec<String>> {
    let session = state.session.read().await;
    Json(session.dismissed_ids())
}

/// Get the wishlist in display order
pub async fn get_wishlist(State(state): State<AppState>) -> Json<Vec<WishlistEntry>> {
    let session = state.session.read().await;
    Json(session.wishlist.clone())
}

/// Add a book to the wishlist, optionally with a note
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Json(request): Json<WishlistRequest>,
) -> AppResult<StatusCode> {
    let mut session = state.session.write().await;
    session.add_to_wishlist(&request.book_id, request.notes)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set display positions of wishlist entries
pub async fn reorder_wishlist(
    State(state): State<AppState>,
    Json(orders): Json<Vec<WishlistOrder>>,
) -> AppResult<Json<Vec<WishlistEntry>>> {
    let mut session = state.session.write().await;
    session.reorder_wishlist(&orders)?;
    Ok(Json(session.wishlist.clone()))
}

/// Remove a book from the wishlist
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<StatusCode> {
    let mut session = state.session.write().await;
    session.remove_from_wishlist(&book_id)?;
    Ok(StatusCode::NO_CONTENT)
}
