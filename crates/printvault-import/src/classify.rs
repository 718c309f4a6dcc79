//! Entry classification: decides what happens to each archive path.
//!
//! Pure functions over the shared rules in `printvault_core::validation`.

use std::sync::OnceLock;

use printvault_core::validation::should_exclude as is_excluded_path;
use printvault_core::{ExtensionRule, ExtensionRules, FileType};

pub use printvault_core::validation::file_name_of;

/// What the extractor should do with a file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision<'r> {
    /// OS metadata or hidden file
    Excluded,
    /// Extension not on the whitelist
    Unsupported,
    Admit(&'r ExtensionRule),
}

/// Classifier bound to one whitelist.
#[derive(Debug, Clone)]
pub struct EntryClassifier {
    rules: ExtensionRules,
}

impl EntryClassifier {
    pub fn new(rules: ExtensionRules) -> Self {
        Self { rules }
    }

    pub fn bulk_import() -> Self {
        Self::new(ExtensionRules::bulk_import())
    }

    /// Exclusion is checked first, against the full path; the whitelist only sees the leaf.
    pub fn decide(&self, path: &str) -> EntryDecision<'_> {
        if is_excluded_path(path) {
            return EntryDecision::Excluded;
        }
        match self.rules.find(file_name_of(path)) {
            Some(rule) => EntryDecision::Admit(rule),
            None => EntryDecision::Unsupported,
        }
    }
}

fn bulk_import_rules() -> &'static ExtensionRules {
    static RULES: OnceLock<ExtensionRules> = OnceLock::new();
    RULES.get_or_init(ExtensionRules::bulk_import)
}

/// Hidden files, `__MACOSX` trees and OS metadata files.
pub fn should_exclude(path: &str) -> bool {
    is_excluded_path(path)
}

/// Classify a filename against the bulk-import whitelist (models and images).
pub fn classify(filename: &str) -> FileType {
    bulk_import_rules().classify(filename)
}

pub fn is_allowed(filename: &str) -> bool {
    bulk_import_rules().is_allowed(filename)
}
