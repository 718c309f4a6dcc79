//! Mock Storage implementation for testing

use async_trait::async_trait;
use chrono::Utc;
use printvault_core::StorageBackend;
use printvault_storage::{Storage, StorageError, StorageResult, UploadDestination};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock storage implementation that stores files in memory
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    slot_requests: AtomicUsize,
    fail_slots: AtomicBool,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    presigned_base: Option<String>,
}

impl MockStorage {
    /// Storage without presigning: slots are [`UploadDestination::Backend`].
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            slot_requests: AtomicUsize::new(0),
            fail_slots: AtomicBool::new(false),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            presigned_base: None,
        }
    }

    /// Storage that hands out presigned `PUT` URLs under `base_url`.
    pub fn presigned(base_url: impl Into<String>) -> Self {
        Self {
            presigned_base: Some(base_url.into()),
            ..Self::new()
        }
    }

    /// Set a file in the mock storage
    pub fn set_file(&self, key: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(key.to_string(), data);
    }

    /// Get file data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Every key passed to `delete`, including attempts that failed
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn slot_requests(&self) -> usize {
        self.slot_requests.load(Ordering::SeqCst)
    }

    pub fn fail_slots(&self, fail: bool) {
        self.fail_slots.store(fail, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn generate_upload_slot(
        &self,
        storage_key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<UploadDestination> {
        self.slot_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_slots.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(
                "simulated presign failure".to_string(),
            ));
        }

        let destination = match &self.presigned_base {
            Some(base) => UploadDestination::PresignedPut {
                url: format!("{}/{}", base.trim_end_matches('/'), storage_key),
                storage_key: storage_key.to_string(),
                content_type: content_type.to_string(),
                expires_at: Utc::now()
                    + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
            },
            None => UploadDestination::Backend {
                storage_key: storage_key.to_string(),
                content_type: content_type.to_string(),
            },
        };
        Ok(destination)
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "simulated upload failure".to_string(),
            ));
        }
        self.set_file(storage_key, data);
        Ok(self.public_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.get_file(storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deleted.lock().unwrap().push(storage_key.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "simulated delete failure".to_string(),
            ));
        }
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.has_file(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://example.com/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        if self.presigned_base.is_some() {
            StorageBackend::S3
        } else {
            StorageBackend::Local
        }
    }
}
