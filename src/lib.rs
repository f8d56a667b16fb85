//! A sharded LRU (Least Recently Used) cache with lazy TTL expiration.
//!
//! This crate provides two cache types:
//!
//! 1. [`LruShard`] - A single mutex-guarded LRU store with O(1) get/put/remove
//! 2. [`ShardedLruCache`] - Routes keys across many shards for better concurrent performance
//!
//! # Features
//!
//! - Thread-safe implementations
//! - Bounded capacity per shard with exact LRU eviction
//! - Optional time-to-live, checked when an entry is read
//! - Generic key type support, with borrowed lookups (`&str` for `String` keys)
//! - Whole-cache reset to a new per-shard capacity
//!
//! Expired entries are not swept in the background. They keep counting
//! against capacity until a read finds them, LRU pressure evicts them, or the
//! caller runs [`ShardedLruCache::purge_expired`].
//!
//! # Examples
//!
//! ```rust
//! use shard_lru::ShardedLruCache;
//! use std::time::Duration;
//!
//! // 16 shards of 128 entries, each entry living for one second
//! let cache = ShardedLruCache::with_ttl(16, 128, Duration::from_secs(1)).unwrap();
//! cache.put("key1".to_string(), "value1".to_string());
//! assert_eq!(cache.get("key1"), Some("value1".to_string()));
//!
//! // Reuse the same instance as a smaller second tier
//! cache.reset(64).unwrap();
//! assert!(cache.is_empty());
//! assert_eq!(cache.capacity_per_shard(), 64);
//! ```

pub mod config;
pub mod error;
pub mod lru_shard;
pub mod sharded_lru_cache;
mod slot_list;
pub mod stats;


pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use lru_shard::{Cache, LruShard};
pub use sharded_lru_cache::ShardedLruCache;
pub use stats::CacheStats;
