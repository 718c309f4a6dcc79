//! Error types for the import pipeline
//!
//! Archive errors are fatal to a whole extraction. Upload errors are per entry and are turned
//! into `UploadOutcome::Failed` by the batch coordinator, never propagated out of it. Every
//! type describes its presentation through [`ErrorMetadata`].

use printvault_core::{AppError, ErrorMetadata, LogLevel, ValidationError};
use printvault_storage::StorageError;
use thiserror::Error;

/// Failures that abort an entire extraction. No partial manifest is ever returned.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Corrupt archive: {0}")]
    Corrupt(String),

    #[error("Archive too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Extraction task failed: {0}")]
    Internal(String),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Corrupt(err.to_string())
    }
}

/// Failures of the direct byte transfer to an upload destination.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload destination responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Storage write failed: {0}")]
    Storage(#[from] StorageError),
}

impl TransferError {
    /// Network failures and 5xx responses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferError::Network(_) => true,
            TransferError::Status { status } => *status >= 500,
            TransferError::Storage(_) => false,
        }
    }
}

/// Per-entry failure of the single-file upload protocol.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to obtain upload slot: {0}")]
    SlotRequest(String),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Failed to persist asset record: {0}")]
    Persistence(#[source] AppError),

    #[error("Import cancelled before upload started")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Precondition failures of a batch import.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No files selected for import")]
    EmptySelection,
}

/// (http_status, error_code, recoverable, suggested_action, sensitive, log_level)
type StaticMetadata = (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
);

fn archive_error_static_metadata(err: &ArchiveError) -> StaticMetadata {
    match err {
        ArchiveError::Corrupt(_) => (
            422,
            "CORRUPT_ARCHIVE",
            false,
            Some("Re-create the zip archive and try again"),
            false,
            LogLevel::Warn,
        ),
        ArchiveError::TooLarge { .. } => (
            413,
            "ARCHIVE_TOO_LARGE",
            false,
            Some("Split the archive into smaller parts"),
            false,
            LogLevel::Debug,
        ),
        ArchiveError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

fn upload_error_static_metadata(err: &UploadError) -> StaticMetadata {
    match err {
        UploadError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Check the file type and size"),
            false,
            LogLevel::Debug,
        ),
        UploadError::SlotRequest(_) => (
            500,
            "UPLOAD_SLOT_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        UploadError::Transfer(_) => (
            502,
            "TRANSFER_FAILED",
            true,
            Some("Check your connection and retry"),
            false,
            LogLevel::Warn,
        ),
        UploadError::Persistence(_) => (
            500,
            "PERSISTENCE_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        UploadError::Cancelled => (499, "CANCELLED", true, None, false, LogLevel::Debug),
        UploadError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for ArchiveError {
    fn http_status_code(&self) -> u16 {
        archive_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        archive_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        archive_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        archive_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        archive_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        archive_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            ArchiveError::Corrupt(_) => "The archive is corrupt or not a zip file".to_string(),
            ArchiveError::TooLarge { .. } => self.to_string(),
            ArchiveError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Validation(err) => err.client_message(),
            UploadError::SlotRequest(_) => "Failed to prepare upload destination".to_string(),
            UploadError::Transfer(err) => err.to_string(),
            UploadError::Persistence(_) => "Failed to save asset record".to_string(),
            UploadError::Cancelled => self.to_string(),
            UploadError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl ErrorMetadata for BatchError {
    fn http_status_code(&self) -> u16 {
        400
    }

    fn error_code(&self) -> &'static str {
        "EMPTY_SELECTION"
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn suggested_action(&self) -> Option<&'static str> {
        Some("Select at least one file to import")
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn is_sensitive(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}
