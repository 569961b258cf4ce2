use anyhow::Result;

use crate::core::AppConfig;
use crate::notify::WebPushDelivery;

/// Check that the configured key pair belongs together and print the
/// public key browsers need to subscribe with.
pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let delivery = WebPushDelivery::new(config.vapid.clone(), config.ttl);
    delivery.verify_key_pair()?;

    println!("VAPID key pair OK");
    println!("Contact: {}", config.vapid.contact);
    println!("VAPID_PUBLIC_KEY={}", delivery.derived_public_key()?);
    Ok(())
}
