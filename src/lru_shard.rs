use crate::error::{CacheError, Result};
use crate::slot_list::SlotList;
use crate::stats::CacheStats;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;
use tracing::trace;

// Upper bound on the index slots reserved up front
const MAX_PREALLOCATED: usize = 1024;

/// The core trait that defines the behavior of a cache implementation.
///
/// This trait provides the basic operations that any cache implementation
/// must support, including get, put, remove, and various utility methods.
///
/// # Type Parameters
///
/// * `K` - The type of keys used in the cache. Must implement `Clone + Debug + Hash + Eq + Send + Sync + 'static`
/// * `V` - The type of values stored in the cache. Must implement `Clone + Send + Sync + 'static`
pub trait Cache<K, V>: Send + Sync
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Retrieves a value from the cache by its key.
    ///
    /// A live entry is cloned and returned, and becomes the most recently
    /// used. An expired entry is dropped on the spot and reported as absent.
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Inserts a key-value pair into the cache.
    ///
    /// An existing key is overwritten in place. Otherwise, if the cache is at
    /// capacity, the least recently used entry is removed to make space.
    fn put(&self, key: K, value: V);

    /// Removes an entry from the cache by its key.
    ///
    /// # Returns
    ///
    /// * `Some(V)` if a live entry existed (returns the removed value)
    /// * `None` if the key didn't exist or had already expired
    fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Removes an entry, ignoring whether it was there.
    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let _ = self.remove(key);
    }

    /// Returns the number of entries in the cache.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries from the cache.
    fn clear(&self);
}

struct Entry<K, V> {
    key: K,
    value: V,
    // None never expires
    expire_at: Option<Instant>,
}

impl<K, V> Entry<K, V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expire_at, Some(at) if now >= at)
    }
}

// Everything a shard guards with its lock. `order` runs from most to least
// recently used and `index` maps each key to its slot in `order`.
struct ShardState<K, V> {
    order: SlotList<Entry<K, V>>,
    index: HashMap<K, usize>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> ShardState<K, V>
where
    K: Clone + Debug + Hash + Eq,
    V: Clone,
{
    fn new(capacity: usize) -> Self {
        let reserved = capacity.min(MAX_PREALLOCATED);
        Self {
            order: SlotList::with_capacity(reserved),
            index: HashMap::with_capacity(reserved),
            capacity,
            stats: CacheStats::default(),
        }
    }

    fn put(&mut self, key: K, value: V, expire_at: Option<Instant>) {
        // 1. Update in place
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(idx) {
                entry.value = value;
                entry.expire_at = expire_at;
            }
            self.order.move_to_front(idx);
            return;
        }

        // 2. Make room, at most one eviction per insert
        if self.order.len() >= self.capacity {
            self.evict_lru();
        }

        // 3. Insert new entry
        let idx = self.order.push_front(Entry {
            key: key.clone(),
            value,
            expire_at,
        });
        self.index.insert(key, idx);
    }

    fn evict_lru(&mut self) {
        if let Some(entry) = self.order.pop_back() {
            self.index.remove(&entry.key);
            self.stats.evictions += 1;
            trace!(key = ?entry.key, "evicted least recently used entry");
        }
    }

    fn expire(&mut self, idx: usize) {
        if let Some(entry) = self.order.remove(idx) {
            self.index.remove(&entry.key);
            self.stats.expirations += 1;
            trace!(key = ?entry.key, "dropped expired entry");
        }
    }

    fn get<Q>(&mut self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&idx) = self.index.get(key) else {
            self.stats.misses += 1;
            return None;
        };

        match self.order.get(idx) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                self.order.move_to_front(idx);
                self.stats.hits += 1;
                Some(value)
            }
            _ => {
                self.expire(idx);
                self.stats.misses += 1;
                None
            }
        }
    }

    fn remove<Q>(&mut self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        let entry = self.order.remove(idx)?;
        if entry.is_expired(now) {
            self.stats.expirations += 1;
            None
        } else {
            Some(entry.value)
        }
    }

    fn contains<Q>(&self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .and_then(|&idx| self.order.get(idx))
            .is_some_and(|entry| !entry.is_expired(now))
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<usize> = self
            .order
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(idx, _)| idx)
            .collect();

        for &idx in &expired {
            self.expire(idx);
        }
        expired.len()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.order.len(),
            ..self.stats
        }
    }
}

/// One independently locked LRU store of bounded capacity.
///
/// Entries are kept in a slot-indexed doubly linked list ordered by recency,
/// with a `HashMap` from key to slot for O(1) lookup, removal and
/// move-to-front. Each operation holds the shard's mutex for its whole
/// duration.
///
/// # Examples
///
/// ```rust
/// use shard_lru::{Cache, LruShard};
///
/// let shard = LruShard::new(2).unwrap();
/// shard.put("a".to_string(), 1);
/// shard.put("b".to_string(), 2);
/// shard.get("a");
/// shard.put("c".to_string(), 3);
///
/// assert_eq!(shard.get("b"), None);
/// assert_eq!(shard.get("a"), Some(1));
/// ```
pub struct LruShard<K, V> {
    state: Mutex<ShardState<K, V>>,
}

impl<K, V> LruShard<K, V>
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty shard holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            state: Mutex::new(ShardState::new(capacity)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Inserts or overwrites `key`, expiring at `expire_at` (`None` never
    /// expires).
    pub fn put_expiring(&self, key: K, value: V, expire_at: Option<Instant>) {
        self.state.lock().put(key, value, expire_at);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        state.get(key, Instant::now())
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.lock();
        state.remove(key, Instant::now())
    }

    /// Reports whether `key` holds a live entry, without refreshing it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let state = self.state.lock();
        state.contains(key, Instant::now())
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.lock();
        state.purge_expired(Instant::now())
    }

    /// Number of stored entries, counting expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().order.is_empty()
    }

    pub fn clear(&self) {
        self.state.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats()
    }
}

impl<K, V> Cache<K, V> for LruShard<K, V>
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        LruShard::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        self.put_expiring(key, value, None);
    }

    fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        LruShard::remove(self, key)
    }

    fn len(&self) -> usize {
        LruShard::len(self)
    }

    fn is_empty(&self) -> bool {
        LruShard::is_empty(self)
    }

    fn clear(&self) {
        LruShard::clear(self)
    }
}
