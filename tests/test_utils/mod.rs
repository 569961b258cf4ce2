//! Test utilities for integration tests
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body};

use push_relay::api::AppState;
use push_relay::api::app;
use push_relay::core::{AppConfig, NotificationDefaults, VapidConfig};
use push_relay::notify::{Delivered, DeliveryFailure, PushDelivery, Subscription};

pub const TEST_PUBLIC_KEY: &str =
    "BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U";

/// Stands in for a push service. The endpoint decides the answer:
/// `.../fail/<code>` fails with that status, `.../offline` fails with
/// no status, `.../slow/<ms>` succeeds after a delay and anything else
/// succeeds with 201.
#[derive(Default)]
pub struct ScriptedDelivery {
    calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
}

impl ScriptedDelivery {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every serialized payload handed to the push service, in arrival
    /// order.
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().expect("Payload log poisoned").clone()
    }
}

#[async_trait]
impl PushDelivery for ScriptedDelivery {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &str,
    ) -> Result<Delivered, DeliveryFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .lock()
            .expect("Payload log poisoned")
            .push(payload.to_string());
        let endpoint = subscription.endpoint.as_str();
        if let Some(code) = endpoint.split("/fail/").nth(1) {
            let code: u16 = code.parse().expect("Invalid scripted status code");
            return Err(DeliveryFailure::new(
                Some(code),
                format!("Received unexpected response code {}", code),
            ));
        }
        if endpoint.ends_with("/offline") {
            return Err(DeliveryFailure::new(None, "connection refused"));
        }
        if let Some(ms) = endpoint.split("/slow/").nth(1) {
            let ms: u64 = ms.parse().expect("Invalid scripted delay");
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        Ok(Delivered { status_code: 201 })
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        port: String::from("3000"),
        vapid: VapidConfig {
            contact: String::from("mailto:test@example.com"),
            public_key: String::from(TEST_PUBLIC_KEY),
            private_key: String::from("test-private-key"),
        },
        ttl: 60,
        defaults: NotificationDefaults::default(),
    }
}

/// Creates a test application router backed by a scripted push
/// service, returning the service too so tests can count deliveries.
pub fn test_app() -> (Router, Arc<ScriptedDelivery>) {
    let delivery = Arc::new(ScriptedDelivery::default());
    let app_state = AppState::new(test_config(), delivery.clone());
    (app(Arc::new(app_state)), delivery)
}

pub fn subscription(path: &str) -> serde_json::Value {
    serde_json::json!({
        "endpoint": format!("https://push.example.com/{}", path),
        "keys": {
            "p256dh": "test-p256dh-key",
            "auth": "test-auth-key"
        }
    })
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}
