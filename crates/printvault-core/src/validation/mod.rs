//! Validation modules
//!
//! Extension whitelists, archive exclusion patterns and per-upload size limits shared by the
//! extraction and upload stages.

pub mod policy;
pub mod rules;

pub use policy::{validate_filename, UploadPolicy, ValidationError};
pub use rules::{
    file_name_of, should_exclude, ExtensionRule, ExtensionRules, FALLBACK_CONTENT_TYPE,
};
