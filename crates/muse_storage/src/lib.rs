use async_trait::async_trait;
use muse_core::{ArticleStore, Error, Result};
use std::path::Path;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn open(path: &Path) -> Result<Self> where Self: Sized;
}

/// Open a store by backend name (`sqlite` or `memory`).
pub async fn create_storage(kind: &str, path: &Path) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let storage = SQLiteStorage::open(path).await.map_err(|e| {
                tracing::error!("{} ({})", SQLiteStorage::get_error_message(), e);
                e
            })?;
            Ok(Arc::new(storage))
        }
        "memory" => Ok(Arc::new(InMemoryStorage::open(path).await?)),
        other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::{create_storage, StorageBackend};
    pub use super::backends::*;
}
