use super::rules::{ExtensionRule, ExtensionRules};
use crate::error::{ErrorMetadata, LogLevel};

const MAX_FILENAME_LENGTH: usize = 255;

/// Client-side validation failures, detected before any storage call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file extension for {filename} (allowed: {allowed:?})")]
    InvalidExtension {
        filename: String,
        allowed: Vec<&'static str>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

impl ErrorMetadata for ValidationError {
    fn http_status_code(&self) -> u16 {
        400
    }

    fn error_code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            ValidationError::FileTooLarge { .. } => Some("Reduce file size"),
            ValidationError::InvalidExtension { .. } => Some("Use a supported file type"),
            ValidationError::InvalidFilename(_) => Some("Rename the file and try again"),
        }
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

/// Upload admission policy: an extension whitelist plus a size ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    rules: ExtensionRules,
    max_size: u64,
}

impl UploadPolicy {
    pub fn new(rules: ExtensionRules, max_size: u64) -> Self {
        Self { rules, max_size }
    }

    /// Models and images from a zip bulk import.
    pub fn bulk_import(max_model_size: u64) -> Self {
        Self::new(ExtensionRules::bulk_import(), max_model_size)
    }

    pub fn models(max_model_size: u64) -> Self {
        Self::new(ExtensionRules::models(), max_model_size)
    }

    pub fn slices(max_slice_size: u64) -> Self {
        Self::new(ExtensionRules::slices(), max_slice_size)
    }

    pub fn rules(&self) -> &ExtensionRules {
        &self.rules
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Validate name and size, returning the matching rule.
    ///
    /// Empty files are admitted; only the upper bound is enforced.
    pub fn validate(&self, filename: &str, size: u64) -> Result<&ExtensionRule, ValidationError> {
        validate_filename(filename)?;

        let rule = self
            .rules
            .find(filename)
            .ok_or_else(|| ValidationError::InvalidExtension {
                filename: filename.to_string(),
                allowed: self.rules.suffixes(),
            })?;

        if size > self.max_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_size,
            });
        }

        Ok(rule)
    }
}

/// Reject names that could escape a storage prefix or are unusable as display names.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::InvalidFilename(
            "filename is empty".to_string(),
        ));
    }
    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::InvalidFilename(format!(
            "filename exceeds {} bytes",
            MAX_FILENAME_LENGTH
        )));
    }
    // A leaf without separators can only traverse when it is a dot segment itself.
    if filename.contains('/') || filename.contains('\\') || filename == "." || filename == ".." {
        return Err(ValidationError::InvalidFilename(
            "filename contains invalid path traversal".to_string(),
        ));
    }
    if filename.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFilename(
            "filename contains control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileType;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_validate_accepts_whitelisted_model() {
        let policy = UploadPolicy::bulk_import(500 * MIB);
        let rule = policy.validate("Benchy.STL", 1024).unwrap();
        assert_eq!(rule.file_type, FileType::Model);
        assert_eq!(rule.content_type, "model/stl");
    }

    #[test]
    fn test_validate_admits_empty_file() {
        let policy = UploadPolicy::models(500 * MIB);
        assert!(policy.validate("empty.stl", 0).is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let policy = UploadPolicy::slices(50 * MIB);
        let err = policy.validate("plate.gcode", 50 * MIB + 1).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FileTooLarge {
                size: 50 * MIB + 1,
                max: 50 * MIB
            }
        );
        assert!(policy.validate("plate.gcode", 50 * MIB).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let policy = UploadPolicy::models(500 * MIB);
        let err = policy.validate("photo.png", 10).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidExtension { .. }));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("model.stl").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("../etc/passwd.stl").is_err());
        assert!(validate_filename("a/b.stl").is_err());
        assert!(validate_filename("bad\u{0}.stl").is_err());
        assert!(validate_filename(&format!("{}.stl", "a".repeat(300))).is_err());
        assert!(validate_filename("..").is_err());
    }

    #[test]
    fn test_double_dot_inside_name_is_accepted() {
        assert!(validate_filename("bracket..v2.stl").is_ok());
        let policy = UploadPolicy::bulk_import(500 * MIB);
        assert!(policy.validate("bracket..v2.stl", 10).is_ok());
    }
}
