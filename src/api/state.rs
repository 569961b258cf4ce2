use crate::core::AppConfig;
use crate::notify::{Dispatcher, SharedPushDelivery};

/// Everything a request handler needs. Built once at startup and never
/// mutated afterwards, so handlers share it without locking.
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: AppConfig, provider: SharedPushDelivery) -> Self {
        let dispatcher = Dispatcher::new(provider, config.defaults.clone());
        Self { config, dispatcher }
    }
}
