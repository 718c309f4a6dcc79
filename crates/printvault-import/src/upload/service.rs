//! Service side of the single-file upload protocol: slot negotiation and confirmation.

use std::sync::Arc;
use std::time::Duration;

use printvault_core::{AssetRecord, FileType, ImportConfig, NewAssetRecord, UploadPolicy};
use printvault_db::AssetStore;
use printvault_storage::{generate_storage_key, Storage, UploadDestination};

use crate::error::UploadError;

/// What the client declares before it is given somewhere to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub filename: String,
    /// Declared MIME type; the whitelist rule's type is used when absent
    pub content_type: Option<String>,
    pub size: u64,
}

/// A validated, time-limited write destination for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    pub filename: String,
    pub file_type: FileType,
    pub storage_key: String,
    pub public_url: String,
    pub content_type: String,
    pub size: u64,
    pub destination: UploadDestination,
}

/// Negotiates upload slots and records completed uploads.
///
/// Storage and persistence are injected capabilities; nothing here is process-global.
pub struct UploadService {
    storage: Arc<dyn Storage>,
    store: Arc<dyn AssetStore>,
    policy: UploadPolicy,
    slot_ttl: Duration,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn Storage>,
        store: Arc<dyn AssetStore>,
        policy: UploadPolicy,
        slot_ttl: Duration,
    ) -> Self {
        Self {
            storage,
            store,
            policy,
            slot_ttl,
        }
    }

    /// Bulk-import service: models and images, model size limit, configured slot TTL.
    pub fn bulk_import(
        storage: Arc<dyn Storage>,
        store: Arc<dyn AssetStore>,
        config: &ImportConfig,
    ) -> Self {
        Self::new(
            storage,
            store,
            UploadPolicy::bulk_import(config.max_model_size_bytes),
            config.upload_slot_ttl(),
        )
    }

    /// Validate the request and obtain a write destination under a fresh storage key.
    ///
    /// Validation failures make no storage call.
    #[tracing::instrument(skip(self, request), fields(filename = %request.filename, size_bytes = request.size))]
    pub async fn request_slot(&self, request: SlotRequest) -> Result<UploadSlot, UploadError> {
        let rule = *self.policy.validate(&request.filename, request.size)?;

        let content_type = request
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| rule.content_type.to_string());
        let storage_key = generate_storage_key(rule.file_type, rule.suffix);

        let destination = self
            .storage
            .generate_upload_slot(&storage_key, &content_type, self.slot_ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    storage_key = %storage_key,
                    "Failed to generate upload slot"
                );
                UploadError::SlotRequest(e.to_string())
            })?;

        tracing::debug!(storage_key = %storage_key, "Upload slot issued");

        Ok(UploadSlot {
            public_url: self.storage.public_url(&storage_key),
            filename: request.filename,
            file_type: rule.file_type,
            storage_key,
            content_type,
            size: request.size,
            destination,
        })
    }

    /// Record a completed upload.
    ///
    /// If the record cannot be created the uploaded object is deleted on a best-effort basis
    /// and the persistence error is returned unchanged.
    #[tracing::instrument(skip(self, slot), fields(storage_key = %slot.storage_key))]
    pub async fn confirm(&self, slot: &UploadSlot) -> Result<AssetRecord, UploadError> {
        let record = NewAssetRecord {
            kind: slot.file_type,
            filename: slot.filename.clone(),
            storage_key: slot.storage_key.clone(),
            public_url: slot.public_url.clone(),
            size: slot.size,
            content_type: slot.content_type.clone(),
        };

        match self.store.create_record(record).await {
            Ok(asset) => {
                tracing::info!(
                    asset_id = %asset.id,
                    storage_key = %slot.storage_key,
                    size_bytes = slot.size,
                    "Asset recorded"
                );
                Ok(asset)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    storage_key = %slot.storage_key,
                    "Failed to persist asset record, removing uploaded object"
                );
                self.cleanup(&slot.storage_key).await;
                Err(UploadError::Persistence(e))
            }
        }
    }

    async fn cleanup(&self, storage_key: &str) {
        if let Err(e) = self.storage.delete(storage_key).await {
            tracing::error!(
                error = %e,
                storage_key = %storage_key,
                "Failed to delete orphaned upload"
            );
        }
    }
}
