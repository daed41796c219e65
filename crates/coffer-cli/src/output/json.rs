//! JSON output for machine consumers.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use coffer_core::ArchiveManifest;
use coffer_core::CreationReport;
use coffer_core::ExtractionReport;
use coffer_core::VerificationReport;
use coffer_core::types::ArchiveEntry;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    name: &'a str,
    kind: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    compressed_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    mode: u32,
    mtime: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gid: Option<u64>,
}

impl<'a> From<&'a ArchiveEntry> for EntryOutput<'a> {
    fn from(entry: &'a ArchiveEntry) -> Self {
        Self {
            name: &entry.name,
            kind: entry.kind.to_string(),
            size: entry.size,
            compressed_size: entry.compressed_size,
            method: entry.method.map(|m| m.to_string()),
            mode: entry.effective_mode(),
            mtime: entry.mtime,
            link_target: entry.link_target.as_deref(),
            uid: entry.uid,
            gid: entry.gid,
        }
    }
}

#[derive(Serialize)]
struct ListingOutput<'a> {
    format: String,
    total_entries: usize,
    total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_compressed: Option<u64>,
    entries: Vec<EntryOutput<'a>>,
}

impl<'a> From<&'a ArchiveManifest> for ListingOutput<'a> {
    fn from(manifest: &'a ArchiveManifest) -> Self {
        Self {
            format: manifest.format.to_string(),
            total_entries: manifest.total_entries,
            total_size: manifest.total_size,
            total_compressed: manifest.total_compressed,
            entries: manifest.entries.iter().map(EntryOutput::from).collect(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        #[derive(Serialize)]
        struct CreationOutput {
            output_path: String,
            files_added: usize,
            directories_added: usize,
            symlinks_added: usize,
            hardlinks_added: usize,
            bytes_written: u64,
            bytes_compressed: u64,
            compression_ratio: f64,
            compression_percentage: f64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = CreationOutput {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_added: report.symlinks_added,
            hardlinks_added: report.hardlinks_added,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("create", data))
    }

    fn format_extraction_result(&self, archive: &Path, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct SkippedOutput<'a> {
            name: &'a str,
            reason: &'static str,
            #[serde(skip_serializing_if = "str::is_empty")]
            message: &'a str,
        }

        #[derive(Serialize)]
        struct ExtractionOutput<'a> {
            archive: String,
            files_extracted: usize,
            directories_created: usize,
            symlinks_created: usize,
            hardlinks_created: usize,
            bytes_written: u64,
            skipped: Vec<SkippedOutput<'a>>,
            warnings: &'a [String],
            duration_ms: u128,
        }

        let data = ExtractionOutput {
            archive: archive.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            hardlinks_created: report.hardlinks_created,
            bytes_written: report.bytes_written,
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedOutput {
                    name: &s.name,
                    reason: s.reason.label(),
                    message: &s.message,
                })
                .collect(),
            warnings: &report.warnings,
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_tar_listing(&self, manifest: &ArchiveManifest, _long: bool) -> Result<()> {
        Self::output(&JsonOutput::success("list", ListingOutput::from(manifest)))
    }

    fn format_zip_listing(&self, manifest: &ArchiveManifest) -> Result<()> {
        Self::output(&JsonOutput::success("list", ListingOutput::from(manifest)))
    }

    fn format_verification_report(
        &self,
        archive: &Path,
        report: &VerificationReport,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct FailureOutput<'a> {
            name: &'a str,
            message: &'a str,
        }

        #[derive(Serialize)]
        struct VerificationOutput<'a> {
            archive: String,
            format: String,
            entries_checked: usize,
            bytes_checked: u64,
            failures: Vec<FailureOutput<'a>>,
        }

        let data = VerificationOutput {
            archive: archive.display().to_string(),
            format: report.format.to_string(),
            entries_checked: report.entries_checked,
            bytes_checked: report.bytes_checked,
            failures: report
                .failures
                .iter()
                .map(|f| FailureOutput {
                    name: &f.name,
                    message: &f.message,
                })
                .collect(),
        };

        if report.is_ok() {
            Self::output(&JsonOutput::success("test", data))
        } else {
            let error = format!("{} member(s) failed verification", report.failures.len());
            Self::output(&JsonOutput::failure("test", data, error))
        }
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        if let Ok(json) = serde_json::to_string_pretty(&output) {
            let _ = writeln!(io::stdout(), "{json}");
        }
    }
}
