//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where the bytes of one upload must be written.
///
/// Opaque to the orchestrating service; only the transfer step interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadDestination {
    /// Time-limited URL the client writes to directly with HTTP `PUT`.
    PresignedPut {
        url: String,
        storage_key: String,
        content_type: String,
        expires_at: DateTime<Utc>,
    },
    /// Backend without presigning: bytes go through [`Storage::upload_with_key`].
    Backend {
        storage_key: String,
        content_type: String,
    },
}

impl UploadDestination {
    pub fn storage_key(&self) -> &str {
        match self {
            UploadDestination::PresignedPut { storage_key, .. }
            | UploadDestination::Backend { storage_key, .. } => storage_key,
        }
    }

    pub fn content_type(&self) -> &str {
        match self {
            UploadDestination::PresignedPut { content_type, .. }
            | UploadDestination::Backend { content_type, .. } => content_type,
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait. The import
/// pipeline only ever sees `Arc<dyn Storage>`, so tests can swap in an in-memory fake.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Prepare a write destination for `storage_key`, valid for `ttl`.
    ///
    /// S3 returns a presigned `PUT` URL; backends without presigning return
    /// [`UploadDestination::Backend`].
    async fn generate_upload_slot(
        &self,
        storage_key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<UploadDestination>;

    /// Upload data to a specific storage key. Returns the public URL for the uploaded file.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Publicly reachable URL for a key
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
