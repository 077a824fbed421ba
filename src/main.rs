use std::sync::Arc;

use book_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::{providers::HttpRecommendationApi, RetryPolicy},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init();

    let api = HttpRecommendationApi::new(&config.recommendation_api_url, config.http_timeout())?;
    let policy = RetryPolicy::from_config(&config);

    tracing::info!(
        api_url = %config.recommendation_api_url,
        max_attempts = policy.max_attempts,
        base_delay_ms = config.refresh_base_delay_ms,
        "Recommendation API configured"
    );

    // Initialize application state
    let state = AppState::new(Arc::new(api), policy);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
