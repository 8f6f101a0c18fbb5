use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::TrackingConfig;
use crate::enrich::extract_client_ip;
use crate::tracking::pixel;
use crate::tracking::{OpenHit, TrackingEngine};

pub struct BeaconState {
    pub engine: Arc<TrackingEngine>,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Deserialize)]
pub struct BeaconParams {
    pub recipient: Option<String>,
    pub campaign: Option<String>,
}

/// Serve the tracking pixel, recording the open as a side effect.
///
/// This endpoint never reports failure: whatever happens during
/// ingestion, the caller gets the same image with the same headers,
/// preserving the invisibility of the tracking mechanism.
pub async fn track_open(
    State(state): State<Arc<BeaconState>>,
    Path(email_id): Path<String>,
    Query(params): Query<BeaconParams>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let client_ip = extract_client_ip(&headers, addr.ip(), &state.tracking);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let hit = OpenHit {
        email_id,
        recipient_email: params.recipient.unwrap_or_default(),
        campaign_id: params.campaign.filter(|c| !c.is_empty()),
        ip: client_ip,
        user_agent,
    };

    let email_id = hit.email_id.clone();
    if let Err(err) = state.engine.record_open(hit).await {
        // The tracked side effect is lost; the pixel is still served.
        tracing::warn!(email_id = %email_id, error = %err, "failed to record open event");
    }

    pixel_response()
}

/// The fixed pixel response with no-cache headers
pub fn pixel_response() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, pixel::CONTENT_TYPE),
            (header::CACHE_CONTROL, pixel::CACHE_CONTROL),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        pixel::TRANSPARENT_GIF,
    )
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
