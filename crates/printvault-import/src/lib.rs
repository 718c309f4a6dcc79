//! Bulk archive import for the asset library.
//!
//! The pipeline has two halves:
//!
//! - [`extract`]: open a zip archive held in memory, classify every entry against the
//!   upload whitelist and produce a manifest of importable files with their contents.
//! - [`batch`]: upload the user's selection through the three-phase single-file protocol
//!   in [`upload`] with bounded concurrency, aggregating per-file outcomes.
//!
//! [`selection`] sits between them, and [`progress`] reports byte-level upload progress.

pub mod archive;
pub mod batch;
pub mod classify;
pub mod error;
pub mod extract;
pub mod progress;
pub mod selection;
pub mod upload;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use batch::BatchImporter;
pub use classify::{classify, is_allowed, should_exclude, EntryClassifier, EntryDecision};
pub use error::{ArchiveError, BatchError, TransferError, UploadError};
pub use extract::{progress_channel, ExtractOptions, ExtractionProgress, Extractor};
pub use progress::{BatchProgress, FileProgress, ProgressTracker};
pub use selection::{Selection, SelectionSummary};
pub use upload::{
    DirectTransfer, RetryPolicy, SingleFileUpload, SlotRequest, TransferClient, UploadService,
    UploadSlot,
};
