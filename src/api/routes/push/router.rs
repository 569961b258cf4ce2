//! Router for the push API

use std::sync::Arc;

use axum::{Json, Router, extract::State, extract::rejection::JsonRejection};

use super::public;
use crate::api::public::{ApiError, InvalidBody};
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

// Send a notification to one subscription
async fn send_push(
    State(state): State<SharedState>,
    payload: Result<Json<public::SendPushRequest>, JsonRejection>,
) -> Result<Json<public::SendPushResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| InvalidBody(e.body_text()))?;

    let delivered = state
        .dispatcher
        .dispatch(request.subscription, request.notification)
        .await?;

    Ok(Json(public::SendPushResponse {
        success: true,
        status_code: delivered.status_code,
        message: String::from("Push notification sent successfully"),
    }))
}

// Send the same notification to many subscriptions. A batch where
// every delivery failed is still a 200 with the full report.
async fn send_push_batch(
    State(state): State<SharedState>,
    payload: Result<Json<public::SendPushBatchRequest>, JsonRejection>,
) -> Result<Json<public::BatchReport>, ApiError> {
    let Json(request) = payload.map_err(|e| InvalidBody(e.body_text()))?;

    let report = state
        .dispatcher
        .dispatch_batch(request.subscriptions, request.notification)
        .await?;

    Ok(Json(report))
}

/// Create the push router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/send-push", axum::routing::post(send_push))
        .route("/send-push-batch", axum::routing::post(send_push_batch))
}
