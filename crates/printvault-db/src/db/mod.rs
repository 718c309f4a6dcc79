//! Database repositories for data access layer
//!
//! The import pipeline only needs to create asset records, exposed through the
//! [`AssetStore`] capability so the upload protocol can run against an in-memory fake.

pub mod asset;
pub mod pool;

pub use asset::{AssetRepository, AssetRow, AssetStore};
pub use pool::{create_pool, run_migrations};
