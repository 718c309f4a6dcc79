//! Selection state over an extracted manifest.

use std::collections::HashSet;

use printvault_core::{ExtractedFile, ExtractionResult};
use serde::Serialize;
use tokio::sync::watch;

/// Published after every selection transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub selected: usize,
    pub total: usize,
    pub selected_bytes: u64,
}

/// Which manifest entries the user has opted into. Starts with everything selected.
///
/// Paths are unique within a manifest, so they identify entries.
pub struct Selection {
    files: Vec<ExtractedFile>,
    selected: HashSet<String>,
    summary_tx: watch::Sender<SelectionSummary>,
}

impl Selection {
    pub fn new(result: ExtractionResult) -> Self {
        let files = result.into_files();
        let selected = files.iter().map(|f| f.path.clone()).collect();
        let (summary_tx, _) = watch::channel(SelectionSummary::default());

        let selection = Self {
            files,
            selected,
            summary_tx,
        };
        selection.publish();
        selection
    }

    /// Flip one path. Unknown paths are ignored. Returns whether the path is now selected.
    pub fn toggle(&mut self, path: &str) -> bool {
        if !self.files.iter().any(|f| f.path == path) {
            tracing::debug!(path = %path, "Ignoring toggle for path outside the manifest");
            return false;
        }

        let now_selected = if self.selected.remove(path) {
            false
        } else {
            self.selected.insert(path.to_string());
            true
        };
        self.publish();
        now_selected
    }

    pub fn select_all(&mut self) {
        self.selected = self.files.iter().map(|f| f.path.clone()).collect();
        self.publish();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.publish();
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.contains(path)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_bytes(&self) -> u64 {
        self.selected_files().iter().map(|f| f.size).sum()
    }

    /// The whole manifest, in archive order.
    pub fn manifest(&self) -> &[ExtractedFile] {
        &self.files
    }

    /// Selected entries in manifest order, regardless of toggle order.
    pub fn selected_files(&self) -> Vec<&ExtractedFile> {
        self.files
            .iter()
            .filter(|f| self.selected.contains(&f.path))
            .collect()
    }

    /// Hand the selected entries (and their content) over to the uploader.
    pub fn into_selected(self) -> Vec<ExtractedFile> {
        let selected = self.selected;
        self.files
            .into_iter()
            .filter(|f| selected.contains(&f.path))
            .collect()
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            selected: self.selected.len(),
            total: self.files.len(),
            selected_bytes: self.selected_bytes(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSummary> {
        self.summary_tx.subscribe()
    }

    fn publish(&self) {
        self.summary_tx.send_replace(self.summary());
    }
}
