use crate::api::ApiClient;
use crate::config::Config;
use std::sync::Arc;

/// Services shared by every handler. Nothing in here is mutable; pages
/// re-fetch from the upstream on each request.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(api: ApiClient, config: Config) -> Self {
        Self {
            api,
            config: Arc::new(config),
        }
    }
}
