//! Bulk import models: the extracted manifest and the per-batch result shape.

use serde::Serialize;
use uuid::Uuid;

use super::asset::FileType;

/// A file admitted from an archive.
///
/// The content buffer is owned exclusively by this value until it is handed to the upload
/// that consumes it, so the type is deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFile {
    /// Full slash-separated path inside the archive
    pub path: String,
    /// Last path segment
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub size: u64,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl ExtractedFile {
    pub fn new(path: impl Into<String>, file_type: FileType, content: Vec<u8>) -> Self {
        let path = path.into();
        let filename = crate::validation::file_name_of(&path).to_string();
        Self {
            path,
            filename,
            file_type,
            size: content.len() as u64,
            content,
        }
    }
}

/// Why entries were left out of a manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipStats {
    pub directories: usize,
    /// Hidden files and OS metadata (`__MACOSX`, `.DS_Store`, ...)
    pub excluded: usize,
    /// Files whose extension is not on the whitelist
    pub unsupported: usize,
}

impl SkipStats {
    pub fn total(&self) -> usize {
        self.directories + self.excluded + self.unsupported
    }
}

/// Manifest produced by one extraction.
///
/// Counters are maintained by [`ExtractionResult::push`] only, which keeps them consistent
/// with `files`: `total_files` is the sum of the model, image and slice counts.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    files: Vec<ExtractedFile>,
    total_files: usize,
    model_count: usize,
    image_count: usize,
    slice_count: usize,
    skipped: SkipStats,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an admitted file, preserving archive order.
    pub fn push(&mut self, file: ExtractedFile) {
        match file.file_type {
            FileType::Model => self.model_count += 1,
            FileType::Image => self.image_count += 1,
            FileType::Slice => self.slice_count += 1,
            FileType::Unknown => {}
        }
        self.total_files += 1;
        self.files.push(file);
    }

    pub fn skipped_mut(&mut self) -> &mut SkipStats {
        &mut self.skipped
    }

    pub fn files(&self) -> &[ExtractedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<ExtractedFile> {
        self.files
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn model_count(&self) -> usize {
        self.model_count
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    pub fn skipped(&self) -> SkipStats {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedAsset {
    pub id: Uuid,
    pub filename: String,
    pub public_url: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedImport {
    pub filename: String,
    pub error_code: String,
    pub message: String,
}

/// Terminal result of one single-file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Imported(ImportedAsset),
    Failed(FailedImport),
}

impl UploadOutcome {
    pub fn filename(&self) -> &str {
        match self {
            UploadOutcome::Imported(asset) => &asset.filename,
            UploadOutcome::Failed(failure) => &failure.filename,
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, UploadOutcome::Imported(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Bytes of successfully imported files only
    pub total_bytes: u64,
}

/// Aggregated result of a batch import. Lists are in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImportResult {
    pub imported: Vec<ImportedAsset>,
    pub failed: Vec<FailedImport>,
    pub summary: BatchSummary,
}

impl BatchImportResult {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = UploadOutcome>) -> Self {
        let mut result = BatchImportResult::default();
        for outcome in outcomes {
            result.record(outcome);
        }
        result
    }

    /// Append one outcome and keep the summary in step.
    pub fn record(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Imported(asset) => {
                self.summary.succeeded += 1;
                self.summary.total_bytes += asset.size;
                self.imported.push(asset);
            }
            UploadOutcome::Failed(failure) => {
                self.summary.failed += 1;
                self.failed.push(failure);
            }
        }
        self.summary.total += 1;
    }

    /// True when at least one entry was submitted and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.summary.total > 0 && self.summary.succeeded == 0
    }
}
