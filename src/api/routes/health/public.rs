//! Public types for the health API
use serde::Serialize;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    // RFC 3339 time the probe was answered
    pub timestamp: String,
    pub vapid_configured: bool,
}
