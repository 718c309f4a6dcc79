//! Printvault Storage Library
//!
//! Storage capability used by the import pipeline: upload slots for direct client writes,
//! keyed writes, reads, and deletes for cleanup. Implementations exist for S3 (and
//! S3-compatible providers) and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are `{prefix}/{uuid}{suffix}` where the prefix is the asset kind (`models`, `images`,
//! `slices`) and the suffix is the matched file extension, e.g. `models/6f1c...e2.stl`.
//! Every upload gets a fresh key, so concurrent uploads never contend.
//!
//! Keys must not contain `..` or a leading `/`. Key generation and validation are
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use printvault_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, UploadDestination};
