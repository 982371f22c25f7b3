use std::sync::Arc;

use shared_config::AppConfig;

use crate::memory::MemoryStore;

/// Shared application state handed to every router. Configuration plus the
/// single store instance all cells write through.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: Arc::new(MemoryStore::new()),
        }
    }
}
