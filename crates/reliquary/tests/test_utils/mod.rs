//! Test utilities for Reliquary tests.
//!
//! Port doubles that record calls or fail on demand.

#![allow(dead_code)]

use async_trait::async_trait;
use reliquary::{
    AssetCache, AssetId, AssetManager, AssetRecord, AssetRepository, AssetStorage,
    InMemoryAssetRepository, InMemoryStorage, ReliquaryResult, SignedUrlService, UploadPolicy,
    UploadRequest,
};
use reliquary_error::{CacheError, RepositoryError, RepositoryErrorKind};
use reliquary_storage::{BlobMetadata, StoredBlob, StoredBytes};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

pub const SECRET: &str = "test-signing-secret";

/// A PNG of exactly `len` bytes.
pub fn png(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len.max(data.len()), 0);
    data
}

/// A well-formed PNG upload request.
pub fn png_upload(len: usize, name: &str) -> UploadRequest {
    UploadRequest::new(png(len), name, "image/png", len as i64)
}

/// Storage that delegates to memory and records every call.
#[derive(Debug, Default)]
pub struct RecordingStorage {
    inner: InMemoryStorage,
    pub saves: AtomicUsize,
    pub gets: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub async fn deleted_paths(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }

    pub fn inner(&self) -> &InMemoryStorage {
        &self.inner
    }
}

#[async_trait]
impl AssetStorage for RecordingStorage {
    async fn save(&self, data: &[u8], metadata: &BlobMetadata) -> ReliquaryResult<StoredBlob> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(data, metadata).await
    }

    async fn get(&self, storage_path: &str) -> ReliquaryResult<StoredBytes> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(storage_path).await
    }

    async fn delete(&self, storage_path: &str) -> ReliquaryResult<()> {
        self.deleted.lock().await.push(storage_path.to_string());
        self.inner.delete(storage_path).await
    }
}

/// Repository whose writes always fail; reads and deletes are counted.
#[derive(Debug, Default)]
pub struct FailingRepository {
    pub finds: AtomicUsize,
    pub deletes: AtomicUsize,
}

#[async_trait]
impl AssetRepository for FailingRepository {
    async fn create(&self, _record: &AssetRecord) -> ReliquaryResult<AssetRecord> {
        Err(RepositoryError::new(RepositoryErrorKind::Connection("database is down".to_string())).into())
    }

    async fn find_by_id(&self, _id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn delete_by_id(&self, _id: AssetId) -> ReliquaryResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Repository whose writes take `delay` before landing in memory.
#[derive(Debug, Default)]
pub struct SlowRepository {
    pub inner: InMemoryAssetRepository,
    pub delay: std::time::Duration,
}

#[async_trait]
impl AssetRepository for SlowRepository {
    async fn create(&self, record: &AssetRecord) -> ReliquaryResult<AssetRecord> {
        tokio::time::sleep(self.delay).await;
        self.inner.create(record).await
    }

    async fn find_by_id(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: AssetId) -> ReliquaryResult<()> {
        self.inner.delete_by_id(id).await
    }
}

/// Repository that delegates to memory and counts deletes.
#[derive(Debug, Default)]
pub struct CountingRepository {
    inner: InMemoryAssetRepository,
    pub finds: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl CountingRepository {
    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetRepository for CountingRepository {
    async fn create(&self, record: &AssetRecord) -> ReliquaryResult<AssetRecord> {
        self.inner.create(record).await
    }

    async fn find_by_id(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: AssetId) -> ReliquaryResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_id(id).await
    }
}

/// Cache where every call fails, counting attempts.
#[derive(Debug, Default)]
pub struct BrokenCache {
    pub calls: AtomicUsize,
}

impl BrokenCache {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetCache for BrokenCache {
    async fn get(&self, _id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::new("cache offline").into())
    }

    async fn set(&self, _record: &AssetRecord) -> ReliquaryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::new("cache offline").into())
    }

    async fn delete(&self, _id: AssetId) -> ReliquaryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::new("cache offline").into())
    }
}

/// Manager over in-memory backends with a signer.
pub fn memory_manager() -> AssetManager {
    AssetManager::builder()
        .storage(Arc::new(InMemoryStorage::new()))
        .repository(Arc::new(InMemoryAssetRepository::new()))
        .signer(SignedUrlService::new(SECRET).expect("Failed to create signer"))
        .policy(UploadPolicy::default())
        .build()
        .expect("Failed to build manager")
}
