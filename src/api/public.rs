//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::notify::DispatchError;

// Errors

/// Body of every failed API response.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub should_delete: bool,
}

/// The request body was not a JSON object we could read at all.
#[derive(Debug, thiserror::Error)]
#[error("Invalid request body: {0}")]
pub struct InvalidBody(pub String);

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = if let Some(err) = self.0.downcast_ref::<DispatchError>() {
            let body = ErrorResponse {
                success: false,
                error: err.to_string(),
                status_code: err.status_code(),
                should_delete: err.should_delete(),
            };
            (err.status(), body)
        } else if let Some(err) = self.0.downcast_ref::<InvalidBody>() {
            tracing::debug!("{}", err);
            let body = ErrorResponse {
                success: false,
                error: err.to_string(),
                status_code: None,
                should_delete: false,
            };
            (StatusCode::BAD_REQUEST, body)
        } else {
            // Anything unexpected gets logged
            tracing::error!("{}", self.0);
            let body = ErrorResponse {
                success: false,
                error: format!("Something went wrong: {}", self.0),
                status_code: None,
                should_delete: false,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, body)
        };

        (status, Json(body)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod health {
    pub use crate::api::routes::health::public::*;
}

pub mod push {
    pub use crate::api::routes::push::public::*;
}

pub mod vapid {
    pub use crate::api::routes::vapid::public::*;
}
