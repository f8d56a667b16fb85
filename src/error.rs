use thiserror::Error;

/// Errors reported when a cache is configured or reconfigured.
///
/// Lookups never fail: a missing or expired key is `None`, not an error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The shard count was zero, leaving nothing to route keys to.
    #[error("shard count must be positive")]
    ZeroShards,

    /// A shard capacity of zero would never hold an entry.
    #[error("capacity per shard must be positive")]
    ZeroCapacity,
}

pub type Result<T> = std::result::Result<T, CacheError>;
