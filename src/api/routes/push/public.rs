//! Public types for the push API
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::notify::{BatchItemResult, BatchReport};

/// Fields are left untyped so that a malformed subscription or
/// notification is reported with our own validation error.
#[derive(Deserialize, Debug, Default)]
pub struct SendPushRequest {
    pub subscription: Option<Value>,
    pub notification: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SendPushBatchRequest {
    pub subscriptions: Option<Value>,
    pub notification: Option<Value>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendPushResponse {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
}
