//! Extension whitelists and archive exclusion patterns.

use crate::models::FileType;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// OS metadata files matched case-insensitively against the whole leaf name
const EXCLUDED_FILENAMES: &[&str] = &["thumbs.db", "desktop.ini"];
const EXCLUDED_LEAF_SUFFIX: &str = ".ds_store";
const EXCLUDED_DIRECTORY: &str = "__MACOSX";

/// One allowed filename suffix and what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionRule {
    /// Lowercase suffix including the leading dot, e.g. `.gcode.3mf`
    pub suffix: &'static str,
    pub file_type: FileType,
    pub content_type: &'static str,
}

impl ExtensionRule {
    pub const fn new(suffix: &'static str, file_type: FileType, content_type: &'static str) -> Self {
        Self {
            suffix,
            file_type,
            content_type,
        }
    }

    /// Longer suffixes are more specific: `.gcode.3mf` beats `.gcode` and `.3mf`.
    pub fn specificity(&self) -> usize {
        self.suffix.len()
    }

    fn matches(&self, lowercase_name: &str) -> bool {
        lowercase_name.len() > self.suffix.len() && lowercase_name.ends_with(self.suffix)
    }
}

const MODEL_RULES: &[ExtensionRule] = &[
    ExtensionRule::new(".stl", FileType::Model, "model/stl"),
    ExtensionRule::new(".3mf", FileType::Model, "model/3mf"),
];

const IMAGE_RULES: &[ExtensionRule] = &[
    ExtensionRule::new(".png", FileType::Image, "image/png"),
    ExtensionRule::new(".jpg", FileType::Image, "image/jpeg"),
    ExtensionRule::new(".jpeg", FileType::Image, "image/jpeg"),
];

const SLICE_RULES: &[ExtensionRule] = &[
    ExtensionRule::new(".gcode.3mf", FileType::Slice, "model/3mf"),
    ExtensionRule::new(".gcode", FileType::Slice, "text/x-gcode"),
];

/// A whitelist of extension rules.
///
/// Matching is case-insensitive against the end of the full filename and the most specific
/// matching rule wins, so the order rules are listed in never changes the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRules {
    rules: Vec<ExtensionRule>,
}

impl ExtensionRules {
    pub fn new(rules: impl IntoIterator<Item = ExtensionRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn models() -> Self {
        Self::new(MODEL_RULES.iter().copied())
    }

    pub fn images() -> Self {
        Self::new(IMAGE_RULES.iter().copied())
    }

    pub fn slices() -> Self {
        Self::new(SLICE_RULES.iter().copied())
    }

    /// Whitelist for zip bulk import: models and images.
    pub fn bulk_import() -> Self {
        Self::new(MODEL_RULES.iter().chain(IMAGE_RULES).copied())
    }

    /// Most specific rule matching `filename`, if any.
    pub fn find(&self, filename: &str) -> Option<&ExtensionRule> {
        let lower = filename.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.matches(&lower))
            .max_by_key(|rule| rule.specificity())
    }

    pub fn classify(&self, filename: &str) -> FileType {
        self.find(filename)
            .map(|rule| rule.file_type)
            .unwrap_or(FileType::Unknown)
    }

    pub fn is_allowed(&self, filename: &str) -> bool {
        self.find(filename).is_some()
    }

    pub fn content_type_for(&self, filename: &str) -> &'static str {
        self.find(filename)
            .map(|rule| rule.content_type)
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }

    pub fn suffixes(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.suffix).collect()
    }

    pub fn rules(&self) -> &[ExtensionRule] {
        &self.rules
    }
}

/// Last slash-separated segment of an archive path. Trailing slashes are ignored.
pub fn file_name_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Whether an archive entry is OS or VCS noise that never belongs in a manifest.
///
/// Only the leaf segment is checked for hidden-file and metadata names; `__MACOSX` is
/// matched as any directory segment.
pub fn should_exclude(path: &str) -> bool {
    let leaf = file_name_of(path);
    if leaf.starts_with('.') {
        return true;
    }

    if path.split('/').any(|segment| segment == EXCLUDED_DIRECTORY) {
        return true;
    }

    let leaf_lower = leaf.to_lowercase();
    EXCLUDED_FILENAMES.contains(&leaf_lower.as_str()) || leaf_lower.ends_with(EXCLUDED_LEAF_SUFFIX)
}
