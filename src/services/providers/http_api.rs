/// JSON-over-HTTP recommendation API client
///
/// API Flow:
/// 1. `POST /get-recommendations` with `{ user_history, user_ratings }`
/// 2. Response `{ recommendations: [ { id, title, author, ... } ] }`
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Book, RatingsSnapshot},
    services::providers::RecommendationApi,
};

const RECOMMENDATIONS_PATH: &str = "/get-recommendations";

#[derive(Clone)]
pub struct HttpRecommendationApi {
    http_client: HttpClient,
    api_url: String,
}

impl HttpRecommendationApi {
    /// Creates a client for the API rooted at `api_url`
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn recommendations_url(&self) -> String {
        format!("{}{}", self.api_url, RECOMMENDATIONS_PATH)
    }
}

/// Extracts the valid books from a response body
///
/// A body without a `recommendations` array fails the attempt; individual
/// entries missing `id`, `title` or `author` are skipped.
pub(crate) fn parse_recommendations(body: &Value) -> AppResult<Vec<Book>> {
    let entries = body["recommendations"].as_array().ok_or_else(|| {
        AppError::MalformedResponse("`recommendations` is missing or not an array".to_string())
    })?;

    let books: Vec<Book> = entries.iter().filter_map(Book::from_value).collect();

    if books.len() < entries.len() {
        tracing::debug!(
            received = entries.len(),
            kept = books.len(),
            "Dropped malformed recommendation entries"
        );
    }

    Ok(books)
}

#[async_trait::async_trait]
impl RecommendationApi for HttpRecommendationApi {
    #[instrument(skip(self, snapshot), fields(rated = snapshot.len()))]
    async fn get_recommendations(&self, snapshot: &RatingsSnapshot) -> AppResult<Vec<Book>> {
        let response = self
            .http_client
            .post(self.recommendations_url())
            .json(snapshot)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommendation API returned status {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("Invalid JSON body: {}", e)))?;

        let books = parse_recommendations(&body)?;

        tracing::info!(
            count = books.len(),
            provider = self.name(),
            "Recommendations fetched"
        );

        Ok(books)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
