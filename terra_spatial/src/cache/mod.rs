mod query_cache;

pub use query_cache::{CacheConfig, CacheKey, QueryCache, QueryKey, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
