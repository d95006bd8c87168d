use std::sync::Arc;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Handle to the cache store backing the sign-in state, shared by the
/// flows that read and write it.
pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

/// Backend selection for the cache store holding per-session sign-in state.
///
/// `Memory` keeps state inside the process and is suitable for tests and
/// single-instance deployments; `Redis` survives restarts and is shared
/// across instances.
#[derive(Debug, Clone)]
pub enum CacheStoreKind {
    Memory,
    Redis { url: String },
}

impl CacheStoreKind {
    /// Build the store, verifying connectivity for networked backends.
    pub async fn connect(self) -> Result<SharedCacheStore, StorageError> {
        let store: Box<dyn CacheStore> = match self {
            Self::Memory => Box::new(InMemoryCacheStore::new()),
            Self::Redis { url } => {
                let client = redis::Client::open(url.as_str())?;
                let store = RedisCacheStore { client };
                store.init().await?;
                tracing::info!("Connected to redis cache store at {url}");
                Box::new(store)
            }
        };

        Ok(Arc::new(Mutex::new(store)))
    }
}
