//! Batch upload coordinator.
//!
//! Fans the single-file protocol out over the selected entries with bounded concurrency and
//! joins every outcome. One entry's failure never cancels or blocks another, and no per-entry
//! error escapes as an `Err`.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use printvault_core::{BatchImportResult, ExtractedFile, ImportConfig};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{BatchError, UploadError};
use crate::progress::{BatchProgress, ProgressTracker};
use crate::upload::protocol::failed_outcome;
use crate::upload::{DirectTransfer, SingleFileUpload, UploadService};

pub struct BatchImporter {
    service: Arc<UploadService>,
    transfer: Arc<dyn DirectTransfer>,
    concurrency: usize,
}

impl BatchImporter {
    /// `concurrency` below 1 is treated as 1.
    pub fn new(
        service: Arc<UploadService>,
        transfer: Arc<dyn DirectTransfer>,
        concurrency: usize,
    ) -> Self {
        Self {
            service,
            transfer,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(
        service: Arc<UploadService>,
        transfer: Arc<dyn DirectTransfer>,
        config: &ImportConfig,
    ) -> Self {
        Self::new(service, transfer, config.import_concurrency)
    }

    /// Upload every file and aggregate the outcomes in completion order.
    ///
    /// Entries still waiting for a worker when `cancel` fires are recorded as `CANCELLED`;
    /// uploads already running finish normally.
    pub async fn import_selected(
        &self,
        files: Vec<ExtractedFile>,
        progress: Option<watch::Sender<BatchProgress>>,
        cancel: CancellationToken,
    ) -> Result<BatchImportResult, BatchError> {
        if files.is_empty() {
            return Err(BatchError::EmptySelection);
        }

        let start = Instant::now();
        let total_files = files.len();
        let total_bytes = files.iter().map(|f| f.size).sum();
        let tracker = ProgressTracker::new(total_bytes, total_files, progress);

        tracing::info!(
            files = total_files,
            size_bytes = total_bytes,
            concurrency = self.concurrency,
            "Starting batch import"
        );

        let mut outcomes = stream::iter(files)
            .map(|file| {
                let service = self.service.clone();
                let transfer = self.transfer.clone();
                let file_progress = tracker.file();
                let cancel = cancel.clone();

                async move {
                    let filename = file.filename.clone();
                    if cancel.is_cancelled() {
                        return failed_outcome(filename, &UploadError::Cancelled);
                    }

                    // A panic inside one upload only fails that entry.
                    let handle = tokio::spawn(async move {
                        SingleFileUpload::new(file)
                            .run(&service, transfer.as_ref(), file_progress)
                            .await
                    });

                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => failed_outcome(filename, &UploadError::Internal(e.to_string())),
                    }
                }
            })
            .buffer_unordered(self.concurrency);

        let mut result = BatchImportResult::default();
        while let Some(outcome) = outcomes.next().await {
            tracker.complete_file();
            result.record(outcome);
        }

        tracing::info!(
            total = result.summary.total,
            succeeded = result.summary.succeeded,
            failed = result.summary.failed,
            size_bytes = result.summary.total_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Batch import finished"
        );

        Ok(result)
    }
}
