use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dispatch::DispatchError;
use crate::core::NotificationDefaults;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Where a browser asked for its push messages to be delivered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl Subscription {
    /// Parse and validate a subscription from untyped request JSON.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        let subscription: Subscription =
            serde_json::from_value(value).map_err(|_| DispatchError::InvalidSubscription)?;
        if subscription.endpoint.trim().is_empty()
            || subscription.keys.p256dh.is_empty()
            || subscription.keys.auth.is_empty()
        {
            return Err(DispatchError::InvalidSubscription);
        }
        Ok(subscription)
    }
}

/// Notification fields as sent by the caller. Only `title` is checked;
/// every other field is kept untyped and falls back to its default when
/// it is missing or not of the expected JSON type.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: Option<Value>,
    pub body: Option<Value>,
    pub icon: Option<Value>,
    pub badge: Option<Value>,
    pub image: Option<Value>,
    pub data: Option<Value>,
    pub actions: Option<Value>,
    pub tag: Option<Value>,
    pub require_interaction: Option<Value>,
}

impl Notification {
    /// Parse a notification and check that it has a non-empty title.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        if !value.is_object() {
            return Err(DispatchError::InvalidNotification);
        }
        let notification: Notification =
            serde_json::from_value(value).map_err(|_| DispatchError::InvalidNotification)?;
        match &notification.title {
            Some(Value::String(title)) if !title.is_empty() => Ok(notification),
            _ => Err(DispatchError::InvalidNotification),
        }
    }

    /// Build the payload that gets delivered, stamped with the current
    /// time.
    pub fn normalize(&self, defaults: &NotificationDefaults) -> NotificationPayload {
        self.normalize_at(defaults, chrono::Utc::now().timestamp_millis())
    }

    pub fn normalize_at(&self, defaults: &NotificationDefaults, timestamp: i64) -> NotificationPayload {
        NotificationPayload {
            title: non_empty_str(&self.title).unwrap_or_default(),
            body: non_empty_str(&self.body).unwrap_or_default(),
            icon: non_empty_str(&self.icon).unwrap_or_else(|| defaults.icon.clone()),
            badge: non_empty_str(&self.badge).unwrap_or_else(|| defaults.badge.clone()),
            // Passed through as given, even when empty
            image: match &self.image {
                Some(Value::String(image)) => Some(image.clone()),
                _ => None,
            },
            data: match &self.data {
                Some(data) if is_truthy(data) => data.clone(),
                _ => Value::Object(Map::new()),
            },
            actions: match &self.actions {
                Some(Value::Array(actions)) => actions.clone(),
                _ => Vec::new(),
            },
            tag: non_empty_str(&self.tag).unwrap_or_else(|| defaults.tag.clone()),
            // Only an explicit `false` turns this off
            require_interaction: !matches!(self.require_interaction, Some(Value::Bool(false))),
            timestamp,
        }
    }
}

fn non_empty_str(field: &Option<Value>) -> Option<String> {
    match field {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

// `null`, `false`, `0` and `""` count as not set
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The JSON document the service worker receives in its `push` event.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub data: Value,
    pub actions: Vec<Value>,
    // When a tag is set, sending new notifications with the same tag
    // will update the user's notification if they have not interacted
    // with it yet.
    pub tag: String,
    pub require_interaction: bool,
    // Epoch millis, fixed once per dispatch
    pub timestamp: i64,
}

impl NotificationPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
