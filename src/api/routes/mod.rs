//! API routes module

pub mod health;
pub mod push;
pub mod vapid;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Liveness probe
        .merge(health::router())
        // Public half of the signing key for browsers to subscribe with
        .merge(vapid::router())
        // Single and batch delivery
        .merge(push::router())
}
