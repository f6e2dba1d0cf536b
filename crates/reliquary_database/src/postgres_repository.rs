//! PostgreSQL-backed asset repository with connection pooling.

use crate::AssetRepository;
use crate::models::AssetRow;
use crate::schema::assets;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use reliquary_core::{AssetId, AssetRecord};
use reliquary_error::{ReliquaryResult, RepositoryError, RepositoryErrorKind};
use tracing::{debug, info, instrument};

/// Schema migrations bundled with the crate.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Asset repository on PostgreSQL.
///
/// Diesel is synchronous, so every query runs on the blocking thread pool
/// with a connection checked out of an r2d2 pool.
#[derive(Debug, Clone)]
pub struct PostgresAssetRepository {
    pool: PgPool,
}

impl PostgresAssetRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool from `DATABASE_URL`.
    ///
    /// # Arguments
    ///
    /// * `pool_size` - Maximum number of connections in the pool
    ///
    /// # Errors
    ///
    /// Returns a connection error if `DATABASE_URL` is unset or the pool
    /// cannot hand out a first connection.
    pub fn from_env(pool_size: u32) -> ReliquaryResult<Self> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            RepositoryError::new(RepositoryErrorKind::Connection(
                "DATABASE_URL environment variable not set".to_string(),
            ))
        })?;

        Self::connect(&database_url, pool_size)
    }

    /// Build a pool for `database_url`.
    pub fn connect(database_url: &str, pool_size: u32) -> ReliquaryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| {
                RepositoryError::new(RepositoryErrorKind::Connection(format!(
                    "Failed to create connection pool: {}",
                    e
                )))
            })?;

        info!(pool_size, "Created PostgreSQL asset repository");
        Ok(Self { pool })
    }

    /// Apply pending schema migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> ReliquaryResult<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || -> ReliquaryResult<()> {
            let mut conn = checkout(&pool)?;
            let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::new(RepositoryErrorKind::Migration(e.to_string()))
            })?;
            info!(count = applied.len(), "Applied migrations");
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}

fn checkout(pool: &PgPool) -> Result<PooledConnection<ConnectionManager<PgConnection>>, RepositoryError> {
    pool.get().map_err(|e| {
        RepositoryError::new(RepositoryErrorKind::Connection(format!(
            "Failed to get connection from pool: {}",
            e
        )))
    })
}

fn join_error(e: tokio::task::JoinError) -> RepositoryError {
    RepositoryError::new(RepositoryErrorKind::Query(format!("Task join error: {}", e)))
}

#[async_trait]
impl AssetRepository for PostgresAssetRepository {
    #[instrument(skip(self, record), fields(asset_id = %record.id))]
    async fn create(&self, record: &AssetRecord) -> ReliquaryResult<AssetRecord> {
        let row = AssetRow::from(record);
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || -> ReliquaryResult<AssetRecord> {
            let mut conn = checkout(&pool)?;

            let inserted = diesel::insert_into(assets::table)
                .values(&row)
                .returning(AssetRow::as_returning())
                .get_result(&mut conn)
                .map_err(RepositoryError::from)?;

            debug!("Inserted asset row");
            Ok(AssetRecord::try_from(inserted)?)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || -> ReliquaryResult<Option<AssetRecord>> {
            let mut conn = checkout(&pool)?;

            let row = assets::table
                .find(id)
                .select(AssetRow::as_select())
                .first(&mut conn)
                .optional()
                .map_err(RepositoryError::from)?;

            Ok(row.map(AssetRecord::try_from).transpose()?)
        })
        .await
        .map_err(join_error)?
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: AssetId) -> ReliquaryResult<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || -> ReliquaryResult<()> {
            let mut conn = checkout(&pool)?;

            let removed = diesel::delete(assets::table.find(id))
                .execute(&mut conn)
                .map_err(RepositoryError::from)?;

            debug!(removed, "Deleted asset row");
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}
