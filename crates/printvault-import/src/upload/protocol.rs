//! Single-file upload state machine.

use bytes::Bytes;
use printvault_core::{
    ErrorMetadata, ExtractedFile, FailedImport, ImportedAsset, LogLevel, UploadOutcome,
};

use super::service::{SlotRequest, UploadService};
use super::transfer::DirectTransfer;
use crate::error::UploadError;
use crate::progress::FileProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    RequestingSlot,
    TransferringBytes,
    Confirming,
    Done,
    Failed,
}

impl UploadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Done | UploadPhase::Failed)
    }
}

/// One file's trip through slot request, transfer and confirmation.
///
/// `run` consumes the instance, so a finished upload cannot be restarted.
pub struct SingleFileUpload {
    file: ExtractedFile,
    phase: UploadPhase,
}

impl SingleFileUpload {
    pub fn new(file: ExtractedFile) -> Self {
        Self {
            file,
            phase: UploadPhase::RequestingSlot,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub async fn run(
        mut self,
        service: &UploadService,
        transfer: &dyn DirectTransfer,
        progress: FileProgress,
    ) -> UploadOutcome {
        let filename = self.file.filename.clone();

        match self.execute(service, transfer, progress).await {
            Ok(asset) => {
                self.transition(UploadPhase::Done);
                UploadOutcome::Imported(asset)
            }
            Err(e) => {
                self.transition(UploadPhase::Failed);
                failed_outcome(filename, &e)
            }
        }
    }

    async fn execute(
        &mut self,
        service: &UploadService,
        transfer: &dyn DirectTransfer,
        progress: FileProgress,
    ) -> Result<ImportedAsset, UploadError> {
        let slot = service
            .request_slot(SlotRequest {
                filename: self.file.filename.clone(),
                content_type: None,
                size: self.file.size,
            })
            .await?;

        self.transition(UploadPhase::TransferringBytes);
        // The content buffer is handed to the transfer and not kept here.
        let body = Bytes::from(std::mem::take(&mut self.file.content));
        transfer.transfer(&slot.destination, body, progress).await?;

        self.transition(UploadPhase::Confirming);
        let record = service.confirm(&slot).await?;

        Ok(ImportedAsset {
            id: record.id,
            filename: record.filename,
            public_url: record.public_url,
            file_type: record.kind,
            size: record.size,
        })
    }

    fn transition(&mut self, next: UploadPhase) {
        tracing::debug!(
            path = %self.file.path,
            from = ?self.phase,
            to = ?next,
            "Upload phase changed"
        );
        self.phase = next;
    }
}

/// Record a per-entry failure, logged at the error's own level.
pub(crate) fn failed_outcome(filename: String, error: &UploadError) -> UploadOutcome {
    match error.log_level() {
        LogLevel::Error => {
            tracing::error!(filename = %filename, error = %error, code = error.error_code(), "Upload failed")
        }
        LogLevel::Warn => {
            tracing::warn!(filename = %filename, error = %error, code = error.error_code(), "Upload failed")
        }
        LogLevel::Debug => {
            tracing::debug!(filename = %filename, error = %error, code = error.error_code(), "Upload failed")
        }
    }

    UploadOutcome::Failed(FailedImport {
        filename,
        error_code: error.error_code().to_string(),
        message: error.client_message(),
    })
}
