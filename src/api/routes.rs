use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::tracking::TrackingEngine;

use super::handlers::{
    create_link, get_campaign_stats, get_email_stats, health_check, list_opens, AppState,
};

pub fn create_api_router(engine: Arc<TrackingEngine>) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/opens", get(list_opens))
        .route("/api/emails/{email_id}/stats", get(get_email_stats))
        .route("/api/campaigns/{campaign_id}/stats", get(get_campaign_stats))
        .route("/api/links", post(create_link))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
