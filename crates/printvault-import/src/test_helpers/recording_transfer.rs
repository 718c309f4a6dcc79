//! Transfer fake that writes straight into [`MockStorage`].

use async_trait::async_trait;
use bytes::Bytes;
use printvault_storage::UploadDestination;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::MockStorage;
use crate::error::TransferError;
use crate::progress::FileProgress;
use crate::upload::DirectTransfer;

pub struct RecordingTransfer {
    storage: Arc<MockStorage>,
    transferred: AtomicUsize,
    fail_status: Option<u16>,
    panic_on: Option<String>,
}

impl RecordingTransfer {
    pub fn new(storage: Arc<MockStorage>) -> Self {
        Self {
            storage,
            transferred: AtomicUsize::new(0),
            fail_status: None,
            panic_on: None,
        }
    }

    /// Every transfer answers with this HTTP status
    pub fn failing(storage: Arc<MockStorage>, status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new(storage)
        }
    }

    /// Panic instead of transferring when the storage key contains `needle`
    pub fn panic_on_key_containing(mut self, needle: &str) -> Self {
        self.panic_on = Some(needle.to_string());
        self
    }

    /// Number of successful transfers
    pub fn transferred(&self) -> usize {
        self.transferred.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectTransfer for RecordingTransfer {
    async fn transfer(
        &self,
        destination: &UploadDestination,
        body: Bytes,
        progress: FileProgress,
    ) -> Result<(), TransferError> {
        let key = destination.storage_key();
        if let Some(needle) = &self.panic_on {
            if key.contains(needle.as_str()) {
                panic!("simulated transfer panic for {}", key);
            }
        }
        if let Some(status) = self.fail_status {
            return Err(TransferError::Status { status });
        }

        progress.advance(body.len() as u64);
        self.storage.set_file(key, body.to_vec());
        self.transferred.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
