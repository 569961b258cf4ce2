//! Single and batch delivery of one notification.
//!
//! A batch fans out one task per subscription and waits for every one
//! of them to finish. A failed delivery is recorded in the report next
//! to the successful ones; it never cancels or fails the batch.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;

use super::models::{Notification, Subscription};
use super::provider::{Delivered, DeliveryFailure, SharedPushDelivery, is_expired_status};
use crate::core::NotificationDefaults;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid subscription object")]
    InvalidSubscription,
    #[error("Invalid notification object")]
    InvalidNotification,
    #[error("Invalid subscriptions array")]
    InvalidSubscriptionList,
    #[error("Subscription expired or invalid")]
    SubscriptionExpired { status_code: u16 },
    #[error("Invalid VAPID keys")]
    InvalidCredentials { status_code: u16 },
    #[error("{message}")]
    DeliveryFailed {
        status_code: Option<u16>,
        message: String,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::InvalidSubscription
            | DispatchError::InvalidNotification
            | DispatchError::InvalidSubscriptionList => StatusCode::BAD_REQUEST,
            DispatchError::SubscriptionExpired { .. } => StatusCode::GONE,
            DispatchError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            DispatchError::DeliveryFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status reported by the push service, if the request got that far.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DispatchError::SubscriptionExpired { status_code }
            | DispatchError::InvalidCredentials { status_code } => Some(*status_code),
            DispatchError::DeliveryFailed { status_code, .. } => *status_code,
            _ => None,
        }
    }

    pub fn should_delete(&self) -> bool {
        matches!(self, DispatchError::SubscriptionExpired { .. })
    }
}

impl From<DeliveryFailure> for DispatchError {
    fn from(failure: DeliveryFailure) -> Self {
        match failure.status_code {
            Some(status_code @ (404 | 410)) => DispatchError::SubscriptionExpired { status_code },
            Some(status_code @ 401) => DispatchError::InvalidCredentials { status_code },
            status_code => DispatchError::DeliveryFailed {
                status_code,
                message: if failure.message.is_empty() {
                    String::from("Failed to send push notification")
                } else {
                    failure.message
                },
            },
        }
    }
}

/// Outcome of one subscription in a batch, at the same index as the
/// subscription in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub should_delete: bool,
}

impl BatchItemResult {
    fn from_outcome(index: usize, outcome: Result<Delivered, DeliveryFailure>) -> Self {
        match outcome {
            Ok(delivered) => Self {
                index,
                success: true,
                status_code: Some(delivered.status_code),
                error: None,
                should_delete: false,
            },
            Err(failure) => Self {
                index,
                success: false,
                status_code: failure.status_code,
                should_delete: failure.should_delete(),
                error: Some(failure.message),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    // At least one delivery went through
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub expired: usize,
    pub total: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchReport {
    pub fn from_results(results: Vec<BatchItemResult>) -> Self {
        let sent = results.iter().filter(|r| r.success).count();
        let failed = results.len() - sent;
        let expired = results
            .iter()
            .filter(|r| !r.success && is_expired_status(r.status_code))
            .count();
        Self {
            success: sent > 0,
            sent,
            failed,
            expired,
            total: results.len(),
            results,
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    provider: SharedPushDelivery,
    defaults: NotificationDefaults,
}

impl Dispatcher {
    pub fn new(provider: SharedPushDelivery, defaults: NotificationDefaults) -> Self {
        Self { provider, defaults }
    }

    /// Validate the request and make exactly one delivery attempt.
    pub async fn dispatch(
        &self,
        subscription: Option<Value>,
        notification: Option<Value>,
    ) -> Result<Delivered, DispatchError> {
        let subscription =
            Subscription::from_value(subscription.ok_or(DispatchError::InvalidSubscription)?)?;
        let notification =
            Notification::from_value(notification.ok_or(DispatchError::InvalidNotification)?)?;

        tracing::info!("Sending push to {}", truncate(&subscription.endpoint, 50));

        let payload = notification
            .normalize(&self.defaults)
            .to_json()
            .map_err(|e| DispatchError::DeliveryFailed {
                status_code: None,
                message: e.to_string(),
            })?;

        match self.provider.send(&subscription, &payload).await {
            Ok(delivered) => {
                tracing::info!("Push sent with status {}", delivered.status_code);
                Ok(delivered)
            }
            Err(failure) => {
                tracing::warn!(
                    status_code = ?failure.status_code,
                    "Push delivery failed: {}",
                    failure.message
                );
                Err(failure.into())
            }
        }
    }

    /// Deliver the same notification to every subscription concurrently
    /// and report each outcome at its original index.
    ///
    /// Only a missing or empty subscription list or an invalid
    /// notification fail the call. Everything else ends up in the report.
    pub async fn dispatch_batch(
        &self,
        subscriptions: Option<Value>,
        notification: Option<Value>,
    ) -> Result<BatchReport, DispatchError> {
        let subscriptions = match subscriptions {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(DispatchError::InvalidSubscriptionList),
        };
        let notification =
            Notification::from_value(notification.ok_or(DispatchError::InvalidNotification)?)?;

        tracing::info!("Sending batch push to {} subscriptions", subscriptions.len());

        // One payload and one timestamp for the whole batch
        let payload: Arc<str> = notification
            .normalize(&self.defaults)
            .to_json()
            .map_err(|e| DispatchError::DeliveryFailed {
                status_code: None,
                message: e.to_string(),
            })?
            .into();

        let total = subscriptions.len();
        let mut slots: Vec<Option<BatchItemResult>> = vec![None; total];
        let mut task_index = HashMap::new();
        let mut tasks = JoinSet::new();

        for (index, value) in subscriptions.into_iter().enumerate() {
            let subscription = match Subscription::from_value(value) {
                Ok(subscription) => subscription,
                Err(err) => {
                    slots[index] = Some(BatchItemResult::from_outcome(
                        index,
                        Err(DeliveryFailure::new(None, err.to_string())),
                    ));
                    continue;
                }
            };
            let provider = Arc::clone(&self.provider);
            let payload = Arc::clone(&payload);
            let handle = tasks.spawn(async move {
                let outcome = provider.send(&subscription, &payload).await;
                (index, outcome)
            });
            task_index.insert(handle.id(), index);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Err(failure) = &outcome {
                        tracing::warn!(
                            index,
                            status_code = ?failure.status_code,
                            "Batch item failed: {}",
                            failure.message
                        );
                    }
                    slots[index] = Some(BatchItemResult::from_outcome(index, outcome));
                }
                Err(join_err) => {
                    tracing::error!("Batch delivery task failed: {}", join_err);
                    if let Some(&index) = task_index.get(&join_err.id()) {
                        slots[index] = Some(BatchItemResult::from_outcome(
                            index,
                            Err(DeliveryFailure::new(
                                None,
                                format!("delivery task failed: {}", join_err),
                            )),
                        ));
                    }
                }
            }
        }

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    BatchItemResult::from_outcome(
                        index,
                        Err(DeliveryFailure::new(None, "delivery task did not complete")),
                    )
                })
            })
            .collect();

        let report = BatchReport::from_results(results);
        tracing::info!(
            "Batch complete: {} sent, {} failed, {} expired",
            report.sent,
            report.failed,
            report.expired
        );
        Ok(report)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
