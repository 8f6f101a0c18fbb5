use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::TrackingConfig;
use crate::tracking::TrackingEngine;

use super::handlers::{health_check, track_open, BeaconState};

pub fn create_beacon_router(engine: Arc<TrackingEngine>, tracking: TrackingConfig) -> Router {
    let state = Arc::new(BeaconState { engine, tracking });

    Router::new()
        .route("/", get(health_check))
        .route("/track/{email_id}", get(track_open))
        .with_state(state)
}
