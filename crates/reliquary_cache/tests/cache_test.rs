//! Tests for asset record caching.

use chrono::Utc;
use reliquary_cache::{AssetCache, AssetCacheConfig, AssetCacheConfigBuilder, InMemoryAssetCache};
use reliquary_core::{AssetRecord, Visibility};
use std::time::Duration;
use uuid::Uuid;

fn record() -> AssetRecord {
    let now = Utc::now();
    AssetRecord {
        id: Uuid::new_v4(),
        display_name: "a.png".to_string(),
        mime_type: "image/png".to_string(),
        size: 8,
        storage_path: "memory/a".to_string(),
        public_url: None,
        owner_id: None,
        visibility: Visibility::Public,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_cache_set_and_get() {
    let cache = InMemoryAssetCache::default();
    let record = record();

    cache.set(&record).await.unwrap();

    assert_eq!(cache.get(record.id).await.unwrap(), Some(record));
}

#[tokio::test]
async fn test_cache_miss() {
    let cache = InMemoryAssetCache::default();
    assert!(cache.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cache_expiration() {
    let cache = InMemoryAssetCache::new(AssetCacheConfig::default().with_ttl_secs(1));
    let record = record();

    cache.set(&record).await.unwrap();
    assert!(cache.get(record.id).await.unwrap().is_some());

    tokio::time::advance(Duration::from_millis(1100)).await;

    assert!(cache.get(record.id).await.unwrap().is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_lru_eviction() {
    let config = AssetCacheConfigBuilder::default()
        .ttl_secs(60)
        .max_entries(2)
        .enabled(true)
        .build()
        .unwrap();
    let cache = InMemoryAssetCache::new(config);

    let (a, b, c) = (record(), record(), record());
    cache.set(&a).await.unwrap();
    cache.set(&b).await.unwrap();

    // Touch `a` so `b` becomes least recently used
    cache.get(a.id).await.unwrap();
    cache.set(&c).await.unwrap();

    assert_eq!(cache.len().await, 2);
    assert!(cache.get(a.id).await.unwrap().is_some());
    assert!(cache.get(b.id).await.unwrap().is_none());
    assert!(cache.get(c.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_disabled_cache_stores_nothing() {
    let cache = InMemoryAssetCache::new(AssetCacheConfig::default().with_enabled(false));
    let record = record();

    cache.set(&record).await.unwrap();

    assert!(cache.get(record.id).await.unwrap().is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_delete_and_cleanup() {
    let cache = InMemoryAssetCache::default();
    let record = record();

    cache.set(&record).await.unwrap();
    cache.delete(record.id).await.unwrap();
    cache.delete(record.id).await.unwrap();

    assert!(cache.get(record.id).await.unwrap().is_none());
    assert_eq!(cache.cleanup_expired().await, 0);
}
