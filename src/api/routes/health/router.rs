//! Router for the health API

use std::sync::Arc;

use axum::{Json, Router, extract::State};

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

async fn health(State(state): State<SharedState>) -> Json<public::HealthResponse> {
    Json(public::HealthResponse {
        status: String::from("ok"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        vapid_configured: state.config.vapid.is_configured(),
    })
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new().route("/health", axum::routing::get(health))
}
