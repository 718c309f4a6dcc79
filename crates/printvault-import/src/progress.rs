//! Byte-level progress aggregation for a batch import.
//!
//! Each transfer reports through its own [`FileProgress`]; the shared [`ProgressTracker`]
//! sums them and publishes a [`BatchProgress`] snapshot on a `watch` channel. Progress is
//! advisory and never feeds back into upload decisions.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub uploaded_bytes: u64,
    pub total_bytes: u64,
    pub completed: usize,
    pub total_files: usize,
}

struct TrackerInner {
    uploaded_bytes: AtomicU64,
    completed: AtomicUsize,
    total_bytes: u64,
    total_files: usize,
    tx: Option<watch::Sender<BatchProgress>>,
}

/// Shared aggregate over every in-flight transfer of one batch.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<TrackerInner>,
}

impl ProgressTracker {
    pub fn new(
        total_bytes: u64,
        total_files: usize,
        tx: Option<watch::Sender<BatchProgress>>,
    ) -> Self {
        let tracker = Self {
            inner: Arc::new(TrackerInner {
                uploaded_bytes: AtomicU64::new(0),
                completed: AtomicUsize::new(0),
                total_bytes,
                total_files,
                tx,
            }),
        };
        tracker.publish();
        tracker
    }

    /// Handle for one file's transfer.
    pub fn file(&self) -> FileProgress {
        FileProgress {
            tracker: Some(self.clone()),
            reported: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Count one finished entry, successful or not.
    pub fn complete_file(&self) {
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
        self.publish();
    }

    pub fn snapshot(&self) -> BatchProgress {
        BatchProgress {
            uploaded_bytes: self.inner.uploaded_bytes.load(Ordering::Relaxed),
            total_bytes: self.inner.total_bytes,
            completed: self.inner.completed.load(Ordering::Relaxed),
            total_files: self.inner.total_files,
        }
    }

    fn add_bytes(&self, bytes: u64) {
        self.inner.uploaded_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.publish();
    }

    fn sub_bytes(&self, bytes: u64) {
        self.inner.uploaded_bytes.fetch_sub(bytes, Ordering::Relaxed);
        self.publish();
    }

    fn publish(&self) {
        if let Some(tx) = &self.inner.tx {
            tx.send_replace(self.snapshot());
        }
    }
}

/// Progress reporter for a single transfer.
#[derive(Clone)]
pub struct FileProgress {
    tracker: Option<ProgressTracker>,
    reported: Arc<AtomicU64>,
}

impl FileProgress {
    /// A reporter that only counts locally, for uploads outside a batch.
    pub fn noop() -> Self {
        Self {
            tracker: None,
            reported: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, bytes: u64) {
        self.reported.fetch_add(bytes, Ordering::Relaxed);
        if let Some(tracker) = &self.tracker {
            tracker.add_bytes(bytes);
        }
    }

    /// Withdraw everything this file reported, before a transfer is retried from the start.
    pub fn rewind(&self) {
        let reported = self.reported.swap(0, Ordering::Relaxed);
        if reported > 0 {
            if let Some(tracker) = &self.tracker {
                tracker.sub_bytes(reported);
            }
        }
    }

    pub fn reported(&self) -> u64 {
        self.reported.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_aggregate_into_tracker() {
        let (tx, rx) = watch::channel(BatchProgress::default());
        let tracker = ProgressTracker::new(100, 2, Some(tx));
        assert_eq!(rx.borrow().total_bytes, 100);

        let a = tracker.file();
        let b = tracker.file();
        a.advance(30);
        b.advance(20);
        a.advance(10);

        assert_eq!(rx.borrow().uploaded_bytes, 60);
        assert_eq!(a.reported(), 40);

        tracker.complete_file();
        assert_eq!(rx.borrow().completed, 1);
    }

    #[test]
    fn test_rewind_only_withdraws_own_bytes() {
        let tracker = ProgressTracker::new(100, 2, None);
        let a = tracker.file();
        let b = tracker.file();
        a.advance(30);
        b.advance(20);

        a.rewind();
        assert_eq!(tracker.snapshot().uploaded_bytes, 20);
        assert_eq!(a.reported(), 0);
    }

    #[test]
    fn test_noop_reporter() {
        let progress = FileProgress::noop();
        progress.advance(5);
        assert_eq!(progress.reported(), 5);
        progress.rewind();
        assert_eq!(progress.reported(), 0);
    }
}
