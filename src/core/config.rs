use std::env;

use anyhow::{Result, anyhow};

const DEFAULT_CONTACT: &str = "mailto:admin@example.com";
const DEFAULT_PORT: &str = "3000";
// Four weeks, the longest TTL push services accept
const DEFAULT_TTL_SECONDS: u32 = 2_419_200;

/// VAPID identity used to sign every push request.
#[derive(Clone, Debug)]
pub struct VapidConfig {
    // Contact URI sent as the `sub` claim
    pub contact: String,
    pub public_key: String,
    pub private_key: String,
}

impl VapidConfig {
    pub fn is_configured(&self) -> bool {
        !self.public_key.is_empty() && !self.private_key.is_empty()
    }
}

/// Values filled into a notification when the caller leaves them out.
#[derive(Clone, Debug)]
pub struct NotificationDefaults {
    pub icon: String,
    pub badge: String,
    pub tag: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            icon: String::from("/favicon.ico"),
            badge: String::from("/favicon.ico"),
            tag: String::from("push-notification"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: String,
    pub vapid: VapidConfig,
    pub ttl: u32,
    pub defaults: NotificationDefaults,
}

impl AppConfig {
    /// Read the configuration from the process environment, loading a
    /// `.env` file first if there is one.
    pub fn from_env() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(anyhow!("Failed to load .env file: {}", err));
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values are
    /// treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (public_key, private_key) = match (get("VAPID_PUBLIC_KEY"), get("VAPID_PRIVATE_KEY")) {
            (Some(public_key), Some(private_key)) => (public_key, private_key),
            _ => {
                return Err(anyhow!(
                    "VAPID keys not configured! Set VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY (generate a pair with `npx web-push generate-vapid-keys`)"
                ));
            }
        };

        let contact = normalize_contact(
            &get("VAPID_EMAIL").unwrap_or_else(|| DEFAULT_CONTACT.to_string()),
        );

        let ttl = match get("PUSH_TTL_SECONDS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|e| anyhow!("Invalid PUSH_TTL_SECONDS {:?}: {}", value, e))?,
            None => DEFAULT_TTL_SECONDS,
        };

        let fallback = NotificationDefaults::default();
        let defaults = NotificationDefaults {
            icon: get("PUSH_DEFAULT_ICON").unwrap_or(fallback.icon),
            badge: get("PUSH_DEFAULT_BADGE").unwrap_or(fallback.badge),
            tag: get("PUSH_DEFAULT_TAG").unwrap_or(fallback.tag),
        };

        Ok(Self {
            port: get("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            vapid: VapidConfig {
                contact,
                public_key: public_key.trim().to_string(),
                private_key: private_key.trim().to_string(),
            },
            ttl,
            defaults,
        })
    }
}

// Push services require the VAPID subject to be a mailto: or https: URI
fn normalize_contact(contact: &str) -> String {
    let contact = contact.trim();
    if contact.starts_with("mailto:") || contact.starts_with("https:") {
        contact.to_string()
    } else {
        format!("mailto:{}", contact)
    }
}
