//! Asset metadata persistence for Reliquary.
//!
//! This crate provides the repository port of the asset service together
//! with an in-memory implementation and, behind the `postgres` feature, a
//! Diesel-based PostgreSQL implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use reliquary_database::PostgresAssetRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = PostgresAssetRepository::from_env(10)?;
//! repo.run_migrations().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod in_memory_repository;
mod repository;

#[cfg(feature = "postgres")]
#[allow(missing_docs)]
mod models;
#[cfg(feature = "postgres")]
mod postgres_repository;
#[cfg(feature = "postgres")]
#[allow(missing_docs)]
pub mod schema;

pub use in_memory_repository::InMemoryAssetRepository;
pub use repository::AssetRepository;

#[cfg(feature = "postgres")]
pub use models::AssetRow;
#[cfg(feature = "postgres")]
pub use postgres_repository::{MIGRATIONS, PostgresAssetRepository};
