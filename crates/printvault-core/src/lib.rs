//! Printvault Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! rules that are shared across all Printvault components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::ImportConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AssetRecord, BatchImportResult, BatchSummary, ExtractedFile, ExtractionResult, FailedImport,
    FileType, ImportedAsset, NewAssetRecord, SkipStats, UploadOutcome,
};
pub use storage_types::StorageBackend;
pub use validation::{ExtensionRule, ExtensionRules, UploadPolicy, ValidationError};
