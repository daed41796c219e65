//! Tar and zip archive engine with path safety validation.
//!
//! `coffer-core` creates, extracts, lists and verifies tar archives (plain
//! or wrapped in gzip, bzip2, xz or zstd) and zip archives. Every member
//! name read from an archive passes through [`security::validate_path`]
//! before anything touches the filesystem, so extraction never writes
//! outside the destination directory.
//!
//! # Examples
//!
//! ```no_run
//! use coffer_core::ExtractionConfig;
//! use coffer_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = extract_archive("archive.tar.gz", "/output/dir", &ExtractionConfig::default())?;
//! println!("extracted {} files", report.files_extracted);
//! for skipped in &report.skipped {
//!     println!("skipped {}: {}", skipped.name, skipped.reason);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod creation;
pub mod error;
pub mod extraction;
pub mod filter;
pub mod formats;
pub mod inspection;
pub mod report;
pub mod security;
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
pub mod types;

pub use api::create_archive;
pub use api::create_archive_with_progress;
pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use config::ExtractionConfig;
pub use creation::CreationConfig;
pub use creation::CreationReport;
pub use error::ArchiveError;
pub use error::PathViolation;
pub use error::Result;
pub use filter::NameFilter;
pub use inspection::ArchiveManifest;
pub use inspection::VerificationReport;
pub use inspection::list_archive;
pub use inspection::verify_archive;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use report::RecordingProgress;
pub use report::SkipReason;
pub use report::SkippedEntry;
