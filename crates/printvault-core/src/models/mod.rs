//! Data models for the import pipeline
//!
//! `asset` holds the persisted record shapes; `import` holds the transient manifest and
//! batch result types that flow through extraction, selection and upload.

mod asset;
mod import;

pub use asset::*;
pub use import::*;
