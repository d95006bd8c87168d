mod cache_store;
mod errors;
mod types;

pub use cache_store::{CacheStore, CacheStoreKind, SharedCacheStore};
pub use errors::StorageError;
pub use types::CacheData;
