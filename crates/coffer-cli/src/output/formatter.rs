//! Output formatter trait and the JSON envelope.

use anyhow::Result;
use coffer_core::ArchiveManifest;
use coffer_core::CreationReport;
use coffer_core::ExtractionReport;
use coffer_core::VerificationReport;
use serde::Serialize;
use std::path::Path;

/// Renders operation results for one output mode.
pub trait OutputFormatter {
    /// Archive written by `tar -c` or `zip`.
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()>;

    /// Members materialized by `tar -x` or `unzip`.
    fn format_extraction_result(&self, archive: &Path, report: &ExtractionReport) -> Result<()>;

    /// `tar -t` listing; `long` adds mode, owner, size and date columns.
    fn format_tar_listing(&self, manifest: &ArchiveManifest, long: bool) -> Result<()>;

    /// `unzip -l` listing.
    fn format_zip_listing(&self, manifest: &ArchiveManifest) -> Result<()>;

    /// `unzip -t` result.
    fn format_verification_report(&self, archive: &Path, report: &VerificationReport)
    -> Result<()>;

    /// Fatal error for `operation`.
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Envelope wrapped around every JSON result.
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    /// A failed operation that still carries its data, as `unzip -t` does.
    pub fn failure(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
