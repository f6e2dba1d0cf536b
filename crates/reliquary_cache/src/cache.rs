//! Asset record cache implementation.

use async_trait::async_trait;
use derive_getters::Getters;
use reliquary_core::{AssetId, AssetRecord};
use reliquary_error::ReliquaryResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Cache port consumed by the asset manager.
///
/// A cache is an ephemeral mirror of repository rows. Callers treat every
/// error as a miss; a failing cache only costs hit rate.
#[async_trait]
pub trait AssetCache: Send + Sync {
    /// Look up a record, `None` on miss.
    async fn get(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>>;

    /// Insert or replace a record.
    async fn set(&self, record: &AssetRecord) -> ReliquaryResult<()>;

    /// Drop a record. Absent ids are not an error.
    async fn delete(&self, id: AssetId) -> ReliquaryResult<()>;
}

/// Cache entry with value and expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    record: AssetRecord,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.created_at.elapsed())
    }
}

/// Configuration for the in-memory asset cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder)]
#[setters(prefix = "with_")]
pub struct AssetCacheConfig {
    /// TTL for cached entries (seconds)
    #[serde(default = "default_ttl")]
    ttl_secs: u64,

    /// Maximum cache size (number of entries)
    #[serde(default = "default_max_entries")]
    max_entries: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_ttl() -> u64 {
    300 // 5 minutes
}

fn default_max_entries() -> usize {
    1000
}

fn default_enabled() -> bool {
    true
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<AssetId, CacheEntry>,
    access_order: Vec<AssetId>,
}

impl CacheState {
    fn touch(&mut self, id: AssetId) {
        if let Some(pos) = self.access_order.iter().position(|k| *k == id) {
            self.access_order.remove(pos);
        }
        self.access_order.push(id);
    }

    fn forget(&mut self, id: AssetId) {
        self.entries.remove(&id);
        if let Some(pos) = self.access_order.iter().position(|k| *k == id) {
            self.access_order.remove(pos);
        }
    }

    /// Evict least recently used entry.
    fn evict_lru(&mut self) {
        if !self.access_order.is_empty() {
            let id = self.access_order.remove(0);
            tracing::debug!(asset_id = %id, "Evicting LRU entry");
            self.entries.remove(&id);
        }
    }
}

/// In-process cache for asset records.
///
/// Stores records with TTL-based expiration and evicts the least recently
/// used entry once `max_entries` is reached.
///
/// # Example
///
/// ```
/// use reliquary_cache::{AssetCache, AssetCacheConfig, InMemoryAssetCache};
///
/// let config = AssetCacheConfig::default().with_ttl_secs(60);
/// let cache = InMemoryAssetCache::new(config);
/// assert_eq!(*cache.config().ttl_secs(), 60);
/// ```
#[derive(Debug)]
pub struct InMemoryAssetCache {
    config: AssetCacheConfig,
    state: Mutex<CacheState>,
}

impl InMemoryAssetCache {
    /// Create a new cache with configuration.
    pub fn new(config: AssetCacheConfig) -> Self {
        tracing::debug!(
            ttl_secs = config.ttl_secs,
            max_entries = config.max_entries,
            enabled = config.enabled,
            "Creating new InMemoryAssetCache"
        );
        Self {
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &AssetCacheConfig {
        &self.config
    }

    /// Remove expired entries from cache.
    pub async fn cleanup_expired(&self) -> usize {
        let mut state = self.state.lock().await;
        let expired: Vec<AssetId> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            state.forget(*id);
        }

        if !expired.is_empty() {
            tracing::info!(
                removed = expired.len(),
                remaining = state.entries.len(),
                "Cleaned up expired cache entries"
            );
        }
        expired.len()
    }

    /// Clear all cache entries.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        let count = state.entries.len();
        state.entries.clear();
        state.access_order.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Get number of cached entries.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Check if cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}

impl Default for InMemoryAssetCache {
    fn default() -> Self {
        Self::new(AssetCacheConfig::default())
    }
}

#[async_trait]
impl AssetCache for InMemoryAssetCache {
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let mut state = self.state.lock().await;
        let Some(entry) = state.entries.get(&id) else {
            return Ok(None);
        };

        if entry.is_expired() {
            tracing::debug!("Cache entry expired, removing");
            state.forget(id);
            return Ok(None);
        }

        let record = entry.record.clone();
        tracing::debug!(time_remaining = ?entry.time_remaining(), "Cache hit");
        state.touch(id);
        Ok(Some(record))
    }

    #[tracing::instrument(skip(self, record), fields(asset_id = %record.id))]
    async fn set(&self, record: &AssetRecord) -> ReliquaryResult<()> {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, skipping insert");
            return Ok(());
        }

        let mut state = self.state.lock().await;

        if state.entries.len() >= self.config.max_entries && !state.entries.contains_key(&record.id)
        {
            state.evict_lru();
        }

        state.touch(record.id);
        state.entries.insert(
            record.id,
            CacheEntry {
                record: record.clone(),
                created_at: Instant::now(),
                ttl: Duration::from_secs(self.config.ttl_secs),
            },
        );
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: AssetId) -> ReliquaryResult<()> {
        self.state.lock().await.forget(id);
        Ok(())
    }
}
