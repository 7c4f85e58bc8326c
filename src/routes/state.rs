use std::sync::Arc;

use crate::{config::Config, db::Store, services::ai::AiClient};

/// Shared application state
///
/// Everything is immutable or internally synchronised, so cloning per request
/// is just reference-count bumps.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub ai: Arc<dyn AiClient>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, ai: Arc<dyn AiClient>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            ai,
        }
    }
}
