//! Repositories shared by every screen

use std::sync::Arc;

use appwrite::Backend;
use common::AppwriteConfig;

use crate::repositories::{
    AccountRepository, media::StorageRepository, posts::PostRepository,
};

/// Data-access state built once at startup
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountRepository,
    pub storage: StorageRepository,
    pub posts: PostRepository,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, config: AppwriteConfig) -> Self {
        let config = Arc::new(config);
        let storage = StorageRepository::new(backend.clone(), config.clone());

        Self {
            accounts: AccountRepository::new(backend.clone(), config.clone()),
            posts: PostRepository::new(backend, config, storage.clone()),
            storage,
        }
    }
}
