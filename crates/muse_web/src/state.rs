use std::sync::Arc;
use muse_core::ArticleStore;

pub struct AppState {
    pub storage: Arc<dyn ArticleStore>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStore>) -> Self {
        Self { storage }
    }
}
