/// Counters describing how a cache has been used.
///
/// Each shard keeps its own copy under its lock; [`ShardedLruCache::stats`]
/// sums them into one snapshot.
///
/// [`ShardedLruCache::stats`]: crate::ShardedLruCache::stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned a live entry
    pub hits: u64,
    /// Lookups for absent or expired keys
    pub misses: u64,
    /// Entries dropped to make room for a new key
    pub evictions: u64,
    /// Expired entries reclaimed, lazily on read or by a purge
    pub expirations: u64,
    /// Entries currently stored, expired ones included until reclaimed
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
        self.expirations += other.expirations;
        self.entries += other.entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.hits = 3;
        stats.misses = 1;
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_merge() {
        let mut total = CacheStats::default();
        let shard = CacheStats {
            hits: 1,
            misses: 2,
            evictions: 3,
            expirations: 4,
            entries: 5,
        };

        total.merge(&shard);
        total.merge(&shard);
        assert_eq!(
            total,
            CacheStats {
                hits: 2,
                misses: 4,
                evictions: 6,
                expirations: 8,
                entries: 10,
            }
        );
    }
}
