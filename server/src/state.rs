//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::store::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<FileStore>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let store = FileStore::new(config.content_dir.clone());
        Self { config: Arc::new(config), store: Arc::new(store) }
    }
}
