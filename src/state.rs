use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::store::Store;
use crate::realtime::Hub;
use crate::storage::{AttachmentStorage, LocalDiskStorage};

/// Shared handles passed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub storage: Arc<dyn AttachmentStorage>,
    pub hub: Hub,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        storage: Arc<dyn AttachmentStorage>,
    ) -> Self {
        Self {
            hub: Hub::new(config.realtime.channel_capacity),
            keys: JwtKeys::from_config(&config.security),
            store,
            storage,
            config: Arc::new(config),
        }
    }

    /// State backed by local-disk attachments under the configured upload dir
    pub fn with_local_storage(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let storage = Arc::new(LocalDiskStorage::from_config(&config.storage));
        Self::new(config, store, storage)
    }
}
