//! Extraction reporting and progress callbacks.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::ArchiveError;

/// Why an entry was not materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Rejected by an include or exclude pattern.
    Filtered,
    /// Name would escape the extraction root.
    UnsafePath,
    /// Target exists and overwrite is off.
    AlreadyExists,
    /// Kind cannot be materialized.
    Unsupported,
    /// Hardlink target was never extracted.
    MissingLinkTarget,
}

impl SkipReason {
    /// Maps a per-entry error to its skip reason.
    #[must_use]
    pub const fn from_error(err: &ArchiveError) -> Option<Self> {
        match err {
            ArchiveError::UnsafePath { .. } => Some(Self::UnsafePath),
            ArchiveError::AlreadyExists { .. } => Some(Self::AlreadyExists),
            ArchiveError::UnsupportedEntryKind { .. } => Some(Self::Unsupported),
            ArchiveError::MissingLinkTarget { .. } => Some(Self::MissingLinkTarget),
            _ => None,
        }
    }

    /// Short label used in summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Filtered => "filtered",
            Self::UnsafePath => "unsafe path",
            Self::AlreadyExists => "already exists",
            Self::Unsupported => "unsupported kind",
            Self::MissingLinkTarget => "missing link target",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One skipped entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Member name as stored in the archive.
    pub name: String,
    /// Why it was skipped.
    pub reason: SkipReason,
    /// Diagnostic message; empty for filtered entries.
    pub message: String,
}

/// Report of an extraction operation.
///
/// # Examples
///
/// ```
/// use coffer_core::{ExtractionReport, SkipReason};
///
/// let mut report = ExtractionReport::new();
/// report.files_extracted = 2;
/// report.record_skip("a.txt", SkipReason::AlreadyExists, "already exists: a.txt");
/// assert_eq!(report.total_items(), 2);
/// assert_eq!(report.skipped_count(SkipReason::AlreadyExists), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,
    /// Number of directories created.
    pub directories_created: usize,
    /// Number of symlinks created.
    pub symlinks_created: usize,
    /// Number of hardlinks created.
    pub hardlinks_created: usize,
    /// Total payload bytes written.
    pub bytes_written: u64,
    /// Entries that were not materialized.
    pub skipped: Vec<SkippedEntry>,
    /// Non-fatal problems, such as a modification time that could not be
    /// restored.
    pub warnings: Vec<String>,
    /// Wall-clock duration.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped entry.
    pub fn record_skip(
        &mut self,
        name: impl Into<String>,
        reason: SkipReason,
        message: impl Into<String>,
    ) {
        self.skipped.push(SkippedEntry {
            name: name.into(),
            reason,
            message: message.into(),
        });
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Number of materialized entries.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted
            + self.directories_created
            + self.symlinks_created
            + self.hardlinks_created
    }

    /// Number of skipped entries.
    #[must_use]
    pub fn entries_skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Number of entries skipped for `reason`.
    #[must_use]
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Receives progress updates while an archive is created or extracted.
///
/// Paths are member names as stored in the archive. `total` is zero when
/// the entry count is not known in advance, as with a streamed tar.
///
/// # Examples
///
/// ```
/// use coffer_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_entry_start(&mut self, path: &Path, _total: usize, current: usize) {
///         println!("{current}: {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is processed. `current` is 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after payload bytes were copied.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been written or materialized.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called when an entry was skipped instead of completed.
    fn on_entry_skipped(&mut self, _path: &Path, _reason: SkipReason) {}

    /// Called once when the operation finishes successfully.
    fn on_complete(&mut self);
}

/// Progress callback that ignores every update.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

/// Collects callback events; handy for tests and for callers that want the
/// entry list after the fact.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    /// Names of completed entries, in order.
    pub completed: Vec<PathBuf>,
    /// Names and reasons of skipped entries, in order.
    pub skipped: Vec<(PathBuf, SkipReason)>,
    /// Sum of reported payload bytes.
    pub bytes: u64,
    /// Whether `on_complete` fired.
    pub finished: bool,
}

impl ProgressCallback for RecordingProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes += bytes;
    }

    fn on_entry_complete(&mut self, path: &Path) {
        self.completed.push(path.to_path_buf());
    }

    fn on_entry_skipped(&mut self, path: &Path, reason: SkipReason) {
        self.skipped.push((path.to_path_buf(), reason));
    }

    fn on_complete(&mut self) {
        self.finished = true;
    }
}

/// Numbers entries for a [`ProgressCallback`].
///
/// `on_entry_start` advances a 1-indexed counter, so callers only pass the
/// entry name.
pub struct ProgressTracker<'a> {
    progress: &'a mut dyn ProgressCallback,
    current_entry: usize,
    total_entries: usize,
}

impl<'a> ProgressTracker<'a> {
    /// Wraps `progress`. Pass zero for `total_entries` if it is unknown.
    pub fn new(progress: &'a mut dyn ProgressCallback, total_entries: usize) -> Self {
        Self {
            progress,
            current_entry: 0,
            total_entries,
        }
    }

    /// Advances the counter and reports the entry start.
    pub fn on_entry_start(&mut self, path: &Path) {
        self.current_entry += 1;
        self.progress
            .on_entry_start(path, self.total_entries, self.current_entry);
    }

    /// Reports copied payload bytes, if any.
    pub fn on_bytes_written(&mut self, bytes: u64) {
        if bytes > 0 {
            self.progress.on_bytes_written(bytes);
        }
    }

    /// Reports a completed entry.
    pub fn on_entry_complete(&mut self, path: &Path) {
        self.progress.on_entry_complete(path);
    }

    /// Reports a skipped entry.
    pub fn on_entry_skipped(&mut self, path: &Path, reason: SkipReason) {
        self.progress.on_entry_skipped(path, reason);
    }

    /// Reports the end of the operation.
    pub fn on_complete(&mut self) {
        self.progress.on_complete();
    }

    /// Entries started so far.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current_entry
    }
}
