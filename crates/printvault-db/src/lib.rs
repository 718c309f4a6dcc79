//! Printvault persistence layer
//!
//! PostgreSQL repositories built on sqlx, plus pool setup and migrations.

pub mod db;

pub use db::{create_pool, run_migrations, AssetRepository, AssetRow, AssetStore};
