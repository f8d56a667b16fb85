use crate::error::{CacheError, Result};
use crate::sharded_lru_cache::ShardedLruCache;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

pub const DEFAULT_SHARD_COUNT: usize = 16;
pub const DEFAULT_CAPACITY_PER_SHARD: usize = 128;

/// Construction parameters for a [`ShardedLruCache`].
///
/// # Examples
///
/// ```rust
/// use shard_lru::{CacheConfig, ShardedLruCache};
/// use std::time::Duration;
///
/// let cache: ShardedLruCache<String, String> = CacheConfig::new()
///     .shard_count(8)
///     .capacity_per_shard(64)
///     .default_ttl(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert_eq!(cache.capacity(), 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of independently locked shards
    pub shard_count: usize,
    /// Maximum entries held by each shard
    pub capacity_per_shard: usize,
    /// Lifetime given to every `put`, `None` keeps entries until evicted
    pub default_ttl: Option<Duration>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.capacity_per_shard = capacity;
        self
    }

    /// Sets the default TTL. A zero duration disables expiration.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(CacheError::ZeroShards);
        }
        if self.capacity_per_shard == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn build<K, V>(&self) -> Result<ShardedLruCache<K, V>>
    where
        K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        ShardedLruCache::from_config(self)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            capacity_per_shard: DEFAULT_CAPACITY_PER_SHARD,
            default_ttl: None,
        }
    }
}
