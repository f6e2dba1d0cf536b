//! PostgreSQL repository tests.
//!
//! Require a reachable database in `DATABASE_URL`:
//!
//! ```bash
//! cargo test -p reliquary_database --features postgres -- --ignored
//! ```

#![cfg(feature = "postgres")]

use chrono::{SubsecRound, Utc};
use reliquary_core::{AssetRecord, Visibility};
use reliquary_database::{AssetRepository, PostgresAssetRepository};
use reliquary_error::{ReliquaryErrorKind, RepositoryErrorKind};
use uuid::Uuid;

async fn repository() -> PostgresAssetRepository {
    dotenvy::dotenv().ok();
    let repo = PostgresAssetRepository::from_env(2).expect("DATABASE_URL must be set");
    repo.run_migrations().await.expect("Failed to run migrations");
    repo
}

fn sample_record() -> AssetRecord {
    // Postgres keeps microseconds
    let now = Utc::now().trunc_subsecs(6);
    AssetRecord {
        id: Uuid::new_v4(),
        display_name: "scan.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        size: 4096,
        storage_path: format!("ab/cd/{}", Uuid::new_v4().simple()),
        public_url: Some("https://cdn.example.com/scan.pdf".to_string()),
        owner_id: Some("u1".to_string()),
        visibility: Visibility::Public,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_create_find_delete() {
    let repo = repository().await;
    let record = sample_record();

    let created = repo.create(&record).await.unwrap();
    assert_eq!(created, record);
    assert_eq!(repo.find_by_id(record.id).await.unwrap(), Some(record.clone()));

    repo.delete_by_id(record.id).await.unwrap();
    assert!(repo.find_by_id(record.id).await.unwrap().is_none());
    repo.delete_by_id(record.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_duplicate_id() {
    let repo = repository().await;
    let record = sample_record();

    repo.create(&record).await.unwrap();
    let err = repo.create(&record).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        ReliquaryErrorKind::Repository(e) if matches!(e.kind, RepositoryErrorKind::DuplicateId(_))
    ));

    repo.delete_by_id(record.id).await.unwrap();
}
