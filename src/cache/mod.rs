//! Cache
//!
//! Cache de respuestas sobre Redis con invalidación por patrones.
//!
//! - `CacheClient`: adaptador del store, degrada en silencio
//! - `CacheKey`: claves deterministas y versionadas
//! - `CacheAside`: envoltorio HIT / MISS / BYPASS de lecturas
//! - `CacheInvalidator`: purga por patrones tras escrituras

pub mod aside;
pub mod cache_config;
pub mod client;
pub mod invalidation;
pub mod keys;
pub mod memory_store;
pub mod metrics;
pub mod operations;
pub mod redis_client;
pub mod resources;

pub use aside::{wants_bypass, CacheAside, CacheMeta, CacheRequest, CacheStatus, Cached, ReadOutcome};
pub use cache_config::{CacheBackend, CacheConfig};
pub use client::{CacheClient, CacheHit};
pub use invalidation::{CacheInvalidator, RelatedIds};
pub use keys::CacheKey;
pub use memory_store::MemoryStore;
pub use operations::{CacheError, CacheOperations, CacheResult, CacheStats};
pub use redis_client::RedisClient;
pub use resources::ResourceType;
