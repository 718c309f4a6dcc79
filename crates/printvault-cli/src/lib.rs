//! Support code for the `printvault-import` binary: logging setup and result rendering.

pub mod output;
pub mod telemetry;

pub use output::{print_manifest, print_result, OutputFormat};
pub use telemetry::init_tracing;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
