//! Router for the VAPID key API

use std::sync::Arc;

use axum::{Json, Router, extract::State};

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

// Only the public key ever leaves the process
async fn public_key(State(state): State<SharedState>) -> Json<public::PublicKeyResponse> {
    Json(public::PublicKeyResponse {
        public_key: state.config.vapid.public_key.clone(),
    })
}

/// Create the VAPID key router
pub fn router() -> Router<SharedState> {
    Router::new().route("/vapid-public-key", axum::routing::get(public_key))
}
