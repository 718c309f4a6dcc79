//! Extraction orchestrator: archive bytes in, manifest of admitted files out.

use std::time::Instant;

use bytes::Bytes;
use printvault_core::{ExtensionRules, ExtractedFile, ExtractionResult, ImportConfig};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::archive::ArchiveReader;
use crate::classify::{EntryClassifier, EntryDecision};
use crate::error::ArchiveError;

const DEFAULT_MAX_ARCHIVE_SIZE: u64 = 500 * 1024 * 1024;

/// Advisory extraction progress, emitted after every considered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionProgress {
    pub processed: usize,
    pub total: usize,
    /// `processed / total * 100`, rounded; always 100 on the final event
    pub percent: u8,
}

impl ExtractionProgress {
    fn new(processed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((processed as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            processed,
            total,
            percent,
        }
    }
}

pub type ProgressSender = mpsc::UnboundedSender<ExtractionProgress>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ExtractionProgress>;

pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub max_archive_size: u64,
    pub rules: ExtensionRules,
}

impl ExtractOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            max_archive_size: config.max_archive_size_bytes,
            rules: ExtensionRules::bulk_import(),
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_archive_size: DEFAULT_MAX_ARCHIVE_SIZE,
            rules: ExtensionRules::bulk_import(),
        }
    }
}

/// Builds manifests from zip archives. Holds no per-archive state, so one extractor can
/// serve any number of sequential or concurrent extractions.
#[derive(Debug, Clone)]
pub struct Extractor {
    max_archive_size: u64,
    classifier: EntryClassifier,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            max_archive_size: options.max_archive_size,
            classifier: EntryClassifier::new(options.rules),
        }
    }

    /// Extract every admitted file, in archive order.
    ///
    /// Any decompression or checksum failure aborts the whole call. Archives with no admitted
    /// entries yield an empty manifest.
    pub fn extract(
        &self,
        bytes: &[u8],
        progress: Option<&ProgressSender>,
    ) -> Result<ExtractionResult, ArchiveError> {
        let start = Instant::now();
        let archive_size = bytes.len() as u64;
        if archive_size > self.max_archive_size {
            return Err(ArchiveError::TooLarge {
                size: archive_size,
                max: self.max_archive_size,
            });
        }

        let mut reader = ArchiveReader::open(bytes)?;
        let total = reader.len();
        let mut result = ExtractionResult::new();
        let mut processed = 0;

        while let Some(entry) = reader.next_entry() {
            let entry = entry?;
            processed += 1;

            if entry.is_directory {
                result.skipped_mut().directories += 1;
            } else {
                match self.classifier.decide(&entry.path) {
                    EntryDecision::Excluded => result.skipped_mut().excluded += 1,
                    EntryDecision::Unsupported => {
                        tracing::debug!(path = %entry.path, "Skipping unsupported archive entry");
                        result.skipped_mut().unsupported += 1;
                    }
                    EntryDecision::Admit(rule) => {
                        let file_type = rule.file_type;
                        let content = reader.read_content(&entry)?;
                        result.push(ExtractedFile::new(entry.path, file_type, content));
                    }
                }
            }

            report(progress, ExtractionProgress::new(processed, total));
        }

        if total == 0 {
            report(progress, ExtractionProgress::new(0, 0));
        }

        let skipped = result.skipped();
        tracing::info!(
            archive_bytes = archive_size,
            entries = total,
            files = result.total_files(),
            models = result.model_count(),
            images = result.image_count(),
            slices = result.slice_count(),
            skipped_directories = skipped.directories,
            skipped_excluded = skipped.excluded,
            skipped_unsupported = skipped.unsupported,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive extracted"
        );

        Ok(result)
    }

    /// Run [`Extractor::extract`] on the blocking pool so decompression never stalls the
    /// async runtime.
    pub async fn extract_blocking(
        &self,
        bytes: Bytes,
        progress: Option<ProgressSender>,
    ) -> Result<ExtractionResult, ArchiveError> {
        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&bytes, progress.as_ref()))
            .await
            .map_err(|e| ArchiveError::Internal(e.to_string()))?
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

/// A dropped receiver only means nobody is watching.
fn report(progress: Option<&ProgressSender>, event: ExtractionProgress) {
    if let Some(tx) = progress {
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{build_zip, ZipFixture};
    use printvault_core::FileType;

    fn drain(mut rx: ProgressReceiver) -> Vec<ExtractionProgress> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_progress_percent_rounding() {
        assert_eq!(ExtractionProgress::new(1, 3).percent, 33);
        assert_eq!(ExtractionProgress::new(2, 3).percent, 67);
        assert_eq!(ExtractionProgress::new(3, 3).percent, 100);
        assert_eq!(ExtractionProgress::new(0, 0).percent, 100);
    }

    #[test]
    fn test_progress_reported_for_every_considered_entry() {
        let bytes = ZipFixture::new()
            .dir("models/")
            .file("models/a.stl", b"a")
            .file("readme.txt", b"b")
            .file(".DS_Store", b"c")
            .build();
        let (tx, rx) = progress_channel();

        let result = Extractor::default().extract(&bytes, Some(&tx)).unwrap();
        let events = drain(rx);

        assert_eq!(result.total_files(), 1);
        assert_eq!(events.len(), 4);
        assert_eq!(events.last().unwrap().percent, 100);
        assert!(events.windows(2).all(|w| w[0].processed < w[1].processed));

        let skipped = result.skipped();
        assert_eq!(skipped.directories, 1);
        assert_eq!(skipped.excluded, 1);
        assert_eq!(skipped.unsupported, 1);
    }

    #[test]
    fn test_empty_archive_reports_completion() {
        let (tx, rx) = progress_channel();
        let result = Extractor::default()
            .extract(&build_zip(&[]), Some(&tx))
            .unwrap();

        assert!(result.is_empty());
        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].percent, 100);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = progress_channel();
        drop(rx);
        let result = Extractor::default()
            .extract(&build_zip(&[("a.stl", b"x")]), Some(&tx))
            .unwrap();
        assert_eq!(result.model_count(), 1);
    }

    #[test]
    fn test_archive_size_limit() {
        let bytes = build_zip(&[("a.stl", b"0123456789")]);
        let extractor = Extractor::new(ExtractOptions {
            max_archive_size: 16,
            ..ExtractOptions::default()
        });

        let err = extractor.extract(&bytes, None).unwrap_err();
        assert!(matches!(err, ArchiveError::TooLarge { max: 16, .. }));
    }

    #[test]
    fn test_custom_rules() {
        let bytes = build_zip(&[("plate.gcode", b"G28"), ("a.stl", b"x")]);
        let extractor = Extractor::new(ExtractOptions {
            rules: ExtensionRules::slices(),
            ..ExtractOptions::default()
        });

        let result = extractor.extract(&bytes, None).unwrap();
        assert_eq!(result.total_files(), 1);
        assert_eq!(result.files()[0].file_type, FileType::Slice);
        assert_eq!(result.model_count() + result.image_count(), 0);
        assert_eq!(result.slice_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_blocking() {
        let bytes = Bytes::from(build_zip(&[("a/b/c/model.stl", b"x")]));
        let result = Extractor::default()
            .extract_blocking(bytes, None)
            .await
            .unwrap();
        assert_eq!(result.files()[0].path, "a/b/c/model.stl");
    }
}
