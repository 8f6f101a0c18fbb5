use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::TrackingRecord;
use crate::storage::RecordFilter;
use crate::tracking::{build_tracking_link, CampaignStats, EmailStats, TrackingEngine, TrackingLink};

pub struct AppState {
    pub engine: Arc<TrackingEngine>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct CreateLinkRequest {
    pub email_id: String,
    pub recipient_email: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    pub base_url: String,
}

/// List raw tracking records with optional equality filters
pub async fn list_opens(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<Vec<TrackingRecord>>, (StatusCode, Json<ErrorResponse>)> {
    match state.engine.find_records(&filter).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to list opens: {}", e),
            }),
        )),
    }
}

/// Per-email open statistics
pub async fn get_email_stats(
    State(state): State<Arc<AppState>>,
    Path(email_id): Path<String>,
) -> Result<Json<EmailStats>, (StatusCode, Json<ErrorResponse>)> {
    match state.engine.email_stats(&email_id).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to compute email stats: {}", e),
            }),
        )),
    }
}

/// Per-campaign open statistics
pub async fn get_campaign_stats(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
) -> Result<Json<CampaignStats>, (StatusCode, Json<ErrorResponse>)> {
    match state.engine.campaign_stats(&campaign_id).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to compute campaign stats: {}", e),
            }),
        )),
    }
}

/// Generate a tracking pixel URL and HTML snippet
pub async fn create_link(
    Json(payload): Json<CreateLinkRequest>,
) -> Result<Json<TrackingLink>, (StatusCode, Json<ErrorResponse>)> {
    match build_tracking_link(
        &payload.email_id,
        &payload.recipient_email,
        payload.campaign_id.as_deref(),
        &payload.base_url,
    ) {
        Ok(link) => Ok(Json(link)),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
