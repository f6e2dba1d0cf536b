//! Asset record caching with TTL support.
//!
//! This crate provides the cache port of the asset service and an
//! in-process implementation, reducing repository reads for hot assets.

#![warn(missing_docs)]

mod cache;

pub use cache::{
    AssetCache, AssetCacheConfig, AssetCacheConfigBuilder, CacheEntry, InMemoryAssetCache,
};
