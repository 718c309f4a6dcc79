//! Table and JSON rendering of manifests and batch results.

use clap::ValueEnum;
use printvault_core::{BatchImportResult, FileType};
use printvault_import::{Selection, SelectionSummary};
use serde::Serialize;

use crate::truncate_string;

const NAME_WIDTH: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry<'a> {
    path: &'a str,
    #[serde(rename = "type")]
    file_type: FileType,
    size: u64,
    selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestReport<'a> {
    files: Vec<ManifestEntry<'a>>,
    summary: SelectionSummary,
}

fn size_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Print the extracted manifest with each entry's selection state.
pub fn print_manifest(selection: &Selection, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = ManifestReport {
                files: selection
                    .manifest()
                    .iter()
                    .map(|f| ManifestEntry {
                        path: &f.path,
                        file_type: f.file_type,
                        size: f.size,
                        selected: selection.is_selected(&f.path),
                    })
                    .collect(),
                summary: selection.summary(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("\n=== Archive Contents ===\n");
            for file in selection.manifest() {
                let mark = if selection.is_selected(&file.path) { "x" } else { " " };
                println!(
                    "[{}] {:<width$} {:<6} {:>10.2} MB",
                    mark,
                    truncate_string(&file.path, NAME_WIDTH),
                    file.file_type.as_str(),
                    size_mb(file.size),
                    width = NAME_WIDTH
                );
            }
            let summary = selection.summary();
            println!(
                "\nSelected: {} of {} files, {:.2} MB",
                summary.selected,
                summary.total,
                size_mb(summary.selected_bytes)
            );
        }
    }
    Ok(())
}

/// Print the outcome of a batch import.
pub fn print_result(result: &BatchImportResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Table => {
            println!("\n=== Import Result ===\n");
            println!(
                "Total: {}  Succeeded: {}  Failed: {}  Size: {:.2} MB",
                result.summary.total,
                result.summary.succeeded,
                result.summary.failed,
                size_mb(result.summary.total_bytes)
            );

            if !result.imported.is_empty() {
                println!("\n--- Imported ---");
                for asset in &result.imported {
                    println!(
                        "{:<width$} {:<6} {}",
                        truncate_string(&asset.filename, NAME_WIDTH),
                        asset.file_type.as_str(),
                        asset.public_url,
                        width = NAME_WIDTH
                    );
                }
            }

            if !result.failed.is_empty() {
                println!("\n--- Failed ---");
                for failure in &result.failed {
                    println!(
                        "{:<width$} {:<20} {}",
                        truncate_string(&failure.filename, NAME_WIDTH),
                        failure.error_code,
                        failure.message,
                        width = NAME_WIDTH
                    );
                }
            }
        }
    }
    Ok(())
}
