use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

use super::models::Subscription;
use crate::core::VapidConfig;

// Push services answer an accepted message with 201 Created
pub const CREATED: u16 = 201;

/// A message the push service accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub status_code: u16,
}

/// A message the push service (or the network) refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DeliveryFailure {
    pub status_code: Option<u16>,
    pub message: String,
}

impl DeliveryFailure {
    pub fn new(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// The subscription is gone for good and should be purged by the
    /// caller.
    pub fn should_delete(&self) -> bool {
        is_expired_status(self.status_code)
    }
}

pub fn is_expired_status(status_code: Option<u16>) -> bool {
    matches!(status_code, Some(404) | Some(410))
}

/// Anything that can hand a serialized payload to a push service.
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn send(&self, subscription: &Subscription, payload: &str)
    -> Result<Delivered, DeliveryFailure>;
}

pub type SharedPushDelivery = Arc<dyn PushDelivery>;

/// Delivers through the Web Push protocol, signing each request with
/// the configured VAPID key pair.
pub struct WebPushDelivery {
    vapid: VapidConfig,
    ttl: u32,
    client: HyperWebPushClient,
}

impl WebPushDelivery {
    pub fn new(vapid: VapidConfig, ttl: u32) -> Self {
        Self {
            vapid,
            ttl,
            client: HyperWebPushClient::new(),
        }
    }

    /// Base64url public key matching the configured private key.
    pub fn derived_public_key(&self) -> Result<String> {
        let partial = VapidSignatureBuilder::from_base64_no_sub(&self.vapid.private_key)
            .map_err(|e| anyhow!("Invalid VAPID private key: {}", e))?;
        Ok(URL_SAFE_NO_PAD.encode(partial.get_public_key()))
    }

    /// Fail if the configured public key does not belong to the private
    /// key, since every push would then be rejected with a 401/403.
    pub fn verify_key_pair(&self) -> Result<()> {
        let derived = self.derived_public_key()?;
        let configured = self.vapid.public_key.trim_end_matches('=');
        if derived != configured {
            return Err(anyhow!(
                "VAPID_PUBLIC_KEY does not match VAPID_PRIVATE_KEY (expected {})",
                derived
            ));
        }
        Ok(())
    }

    fn build_message(
        &self,
        subscription: &Subscription,
        payload: &str,
    ) -> Result<web_push::WebPushMessage, WebPushError> {
        let subscription_info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.keys.p256dh.clone(),
            subscription.keys.auth.clone(),
        );

        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&self.vapid.private_key, &subscription_info)?;
        sig_builder.add_claim("sub", self.vapid.contact.as_str());
        let signature = sig_builder.build()?;

        let mut builder = WebPushMessageBuilder::new(&subscription_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());
        builder.set_ttl(self.ttl);
        builder.set_vapid_signature(signature);
        builder.build()
    }
}

#[async_trait]
impl PushDelivery for WebPushDelivery {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &str,
    ) -> Result<Delivered, DeliveryFailure> {
        let message = self
            .build_message(subscription, payload)
            .map_err(|e| failure_from_web_push(&e))?;

        self.client
            .send(message)
            .await
            .map(|_| Delivered {
                status_code: CREATED,
            })
            .map_err(|e| failure_from_web_push(&e))
    }
}

/// Recover the HTTP status a push service answered with from the error
/// `web-push` turned it into. Local failures (bad keys, bad URI, I/O)
/// never reached a push service and carry no status.
pub fn failure_from_web_push(error: &WebPushError) -> DeliveryFailure {
    let status_code = match error {
        WebPushError::BadRequest { .. } => Some(400),
        WebPushError::Unauthorized { .. } => Some(401),
        WebPushError::EndpointNotFound { .. } => Some(404),
        WebPushError::EndpointNotValid { .. } => Some(410),
        WebPushError::PayloadTooLarge { .. } => Some(413),
        WebPushError::ServerError { .. } => Some(500),
        WebPushError::NotImplemented { .. } => Some(501),
        _ => None,
    };
    DeliveryFailure::new(status_code, error.to_string())
}
