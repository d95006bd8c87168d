mod config;
mod memory;
mod redis;
mod types;

pub use config::{CacheStoreKind, SharedCacheStore};
pub use types::CacheStore;
