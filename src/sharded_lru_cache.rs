use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::lru_shard::{Cache, LruShard};
use crate::stats::CacheStats;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::mem;
use std::time::{Duration, Instant};
use tracing::debug;

/// A sharded LRU cache with optional expiration, for high-concurrency scenarios.
///
/// Keys are spread over a fixed number of [`LruShard`]s, each protected by its
/// own mutex, to reduce contention in concurrent access scenarios. Every shard
/// enforces its capacity on its own; there is no global LRU order.
///
/// The shard array itself sits behind a `RwLock`. Regular operations take the
/// read side, so they run in parallel, while [`reset`](Self::reset) takes the
/// write side and swaps the whole array once in-flight operations are done.
///
/// # Type Parameters
///
/// * `K` - The type of keys used in the cache. Must implement `Clone + Debug + Hash + Eq + Send + Sync + 'static`
/// * `V` - The type of values stored in the cache. Must implement `Clone + Send + Sync + 'static`
///
/// # Examples
///
/// ```rust
/// use shard_lru::ShardedLruCache;
/// use std::time::Duration;
///
/// let cache = ShardedLruCache::with_ttl(16, 128, Duration::from_secs(1)).unwrap();
/// cache.put("key1".to_string(), "value1".to_string());
/// assert_eq!(cache.get("key1"), Some("value1".to_string()));
///
/// cache.delete("key1");
/// assert_eq!(cache.get("key1"), None);
/// ```
pub struct ShardedLruCache<K, V> {
    shards: RwLock<Vec<LruShard<K, V>>>,
    num_shards: usize,
    default_ttl: Option<Duration>,
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache of `shard_count` shards holding up to
    /// `capacity_per_shard` entries each. Entries never expire.
    ///
    /// # Errors
    ///
    /// Fails if either count is zero.
    pub fn new(shard_count: usize, capacity_per_shard: usize) -> Result<Self> {
        Self::from_config(
            &CacheConfig::new()
                .shard_count(shard_count)
                .capacity_per_shard(capacity_per_shard),
        )
    }

    /// Like [`new`](Self::new), but every `put` expires after `ttl`. A zero
    /// `ttl` disables expiration.
    pub fn with_ttl(shard_count: usize, capacity_per_shard: usize, ttl: Duration) -> Result<Self> {
        Self::from_config(
            &CacheConfig::new()
                .shard_count(shard_count)
                .capacity_per_shard(capacity_per_shard)
                .default_ttl(ttl),
        )
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let shards = build_shards(config.shard_count, config.capacity_per_shard)?;
        let default_ttl = config.default_ttl.filter(|ttl| !ttl.is_zero());

        debug!(
            shards = config.shard_count,
            capacity_per_shard = config.capacity_per_shard,
            ttl = ?default_ttl,
            "created sharded LRU cache"
        );

        Ok(Self {
            shards: RwLock::new(shards),
            num_shards: config.shard_count,
            default_ttl,
        })
    }

    /// Returns the total capacity of the cache.
    pub fn capacity(&self) -> usize {
        self.num_shards * self.capacity_per_shard()
    }

    pub fn capacity_per_shard(&self) -> usize {
        self.shards.read().first().map_or(0, LruShard::capacity)
    }

    /// Returns the number of shards in the cache.
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Index of the shard that owns `key`.
    ///
    /// Depends only on the key and the shard count, so it is stable for the
    /// lifetime of the cache, resets included.
    pub fn shard_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.num_shards as u64) as usize
    }

    fn with_shard<Q, R>(&self, key: &Q, f: impl FnOnce(&LruShard<K, V>) -> R) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.shard_index(key);
        let shards = self.shards.read();
        f(&shards[idx])
    }

    /// Inserts a key-value pair, expiring after the default TTL if one is set.
    ///
    /// An existing key is overwritten and its expiration restarted. If the
    /// key's shard is full, its least recently used entry is evicted.
    pub fn put(&self, key: K, value: V) {
        let expire_at = self.default_ttl.and_then(deadline);
        let idx = self.shard_index(&key);
        self.shards.read()[idx].put_expiring(key, value, expire_at);
    }

    /// Inserts a key-value pair expiring after `ttl` instead of the default.
    /// A zero `ttl` never expires.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expire_at = Some(ttl).filter(|ttl| !ttl.is_zero()).and_then(deadline);
        let idx = self.shard_index(&key);
        self.shards.read()[idx].put_expiring(key, value, expire_at);
    }

    /// Retrieves a value from the cache by its key.
    ///
    /// A live entry is cloned and returned, and becomes the most recently
    /// used in its shard. An expired entry is removed and `None` returned.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_shard(key, |shard| shard.get(key))
    }

    /// Removes an entry from the cache by its key.
    ///
    /// # Returns
    ///
    /// * `Some(V)` if a live entry existed (returns the removed value)
    /// * `None` if the key didn't exist or had already expired
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_shard(key, |shard| shard.remove(key))
    }

    /// Removes an entry if present. Absent keys are ignored.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let _ = self.remove(key);
    }

    /// Reports whether `key` holds a live entry, without refreshing it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_shard(key, |shard| shard.contains(key))
    }

    /// Replaces every shard with an empty one of `capacity_per_shard`,
    /// discarding all entries and counters.
    ///
    /// Used to repurpose the cache as a differently sized second tier. This
    /// waits for operations already running against the old shards to finish.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity_per_shard` is 0, in
    /// which case the cache is left untouched.
    pub fn reset(&self, capacity_per_shard: usize) -> Result<()> {
        let fresh = build_shards(self.num_shards, capacity_per_shard)?;

        let mut shards = self.shards.write();
        let old = mem::replace(&mut *shards, fresh);
        drop(shards);

        let dropped: usize = old.iter().map(LruShard::len).sum();
        debug!(capacity_per_shard, dropped, "reset all shards");
        Ok(())
    }

    /// Drops expired entries in every shard and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.shards.read().iter().map(LruShard::purge_expired).sum()
    }

    /// Returns the number of stored entries, counting expired ones that have
    /// not been reclaimed yet.
    pub fn len(&self) -> usize {
        self.shards.read().iter().map(LruShard::len).sum()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.read().iter().all(LruShard::is_empty)
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        for shard in self.shards.read().iter() {
            shard.clear();
        }
    }

    /// Sums the counters of every shard.
    pub fn stats(&self) -> CacheStats {
        let mut total = CacheStats::default();
        for shard in self.shards.read().iter() {
            total.merge(&shard.stats());
        }
        total
    }

    #[cfg(test)]
    pub(crate) fn shard_lens(&self) -> Vec<usize> {
        self.shards.read().iter().map(LruShard::len).collect()
    }
}

fn build_shards<K, V>(num_shards: usize, capacity: usize) -> Result<Vec<LruShard<K, V>>>
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    if num_shards == 0 {
        return Err(CacheError::ZeroShards);
    }
    (0..num_shards).map(|_| LruShard::new(capacity)).collect()
}

// An unrepresentable deadline is treated as never expiring
fn deadline(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

impl<K, V> Cache<K, V> for ShardedLruCache<K, V>
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        ShardedLruCache::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        ShardedLruCache::put(self, key, value)
    }

    fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        ShardedLruCache::remove(self, key)
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        ShardedLruCache::delete(self, key)
    }

    fn len(&self) -> usize {
        ShardedLruCache::len(self)
    }

    fn is_empty(&self) -> bool {
        ShardedLruCache::is_empty(self)
    }

    fn clear(&self) {
        ShardedLruCache::clear(self)
    }
}
