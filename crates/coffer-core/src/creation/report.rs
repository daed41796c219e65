//! Archive creation reporting.

use std::time::Duration;

use crate::types::EntryKind;

/// Report of an archive creation operation.
///
/// # Examples
///
/// ```
/// use coffer_core::creation::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Regular files written.
    pub files_added: usize,

    /// Directory entries written.
    pub directories_added: usize,

    /// Symlink entries written.
    pub symlinks_added: usize,

    /// Hardlink entries written.
    pub hardlinks_added: usize,

    /// Payload bytes read from the source files.
    pub bytes_written: u64,

    /// Size of the finished archive on disk.
    pub bytes_compressed: u64,

    /// Wall-clock duration.
    pub duration: Duration,

    /// Non-fatal problems noticed while walking the inputs.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one written entry of `kind`.
    pub fn record(&mut self, kind: EntryKind, payload: u64) {
        match kind {
            EntryKind::File => self.files_added += 1,
            EntryKind::Directory => self.directories_added += 1,
            EntryKind::Symlink => self.symlinks_added += 1,
            EntryKind::Hardlink => self.hardlinks_added += 1,
            EntryKind::Other(_) => {}
        }
        self.bytes_written += payload;
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression ratio (uncompressed / compressed), or 0.0 if
    /// either side is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the share of space saved, in percent. Never negative.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        if self.bytes_compressed == 0 {
            return 100.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }

    /// Total number of entries written.
    ///
    /// # Examples
    ///
    /// ```
    /// use coffer_core::creation::CreationReport;
    /// use coffer_core::types::EntryKind;
    ///
    /// let mut report = CreationReport::new();
    /// report.record(EntryKind::File, 10);
    /// report.record(EntryKind::Directory, 0);
    /// report.record(EntryKind::Hardlink, 0);
    /// assert_eq!(report.entries_written(), 3);
    /// assert_eq!(report.bytes_written, 10);
    /// ```
    #[must_use]
    pub fn entries_written(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added + self.hardlinks_added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_report_default() {
        let report = CreationReport::default();
        assert_eq!(report.entries_written(), 0);
        assert_eq!(report.bytes_written, 0);
        assert_eq!(report.bytes_compressed, 0);
        assert_eq!(report.duration, Duration::default());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_record_by_kind() {
        let mut report = CreationReport::new();
        report.record(EntryKind::File, 100);
        report.record(EntryKind::File, 23);
        report.record(EntryKind::Directory, 0);
        report.record(EntryKind::Symlink, 0);
        report.record(EntryKind::Other(b'6'), 0);
        assert_eq!(report.files_added, 2);
        assert_eq!(report.directories_added, 1);
        assert_eq!(report.symlinks_added, 1);
        assert_eq!(report.entries_written(), 4);
        assert_eq!(report.bytes_written, 123);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_compression_ratio_edges() {
        let mut report = CreationReport::new();
        report.bytes_written = 1000;
        report.bytes_compressed = 500;
        assert_eq!(report.compression_ratio(), 2.0);

        report.bytes_compressed = 0;
        assert_eq!(report.compression_ratio(), 0.0);

        report.bytes_written = 0;
        report.bytes_compressed = 500;
        assert_eq!(report.compression_ratio(), 0.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_compression_percentage_edges() {
        let mut report = CreationReport::new();
        report.bytes_written = 1000;
        report.bytes_compressed = 250;
        assert_eq!(report.compression_percentage(), 75.0);

        // Expansion reports zero, not a negative saving.
        report.bytes_written = 500;
        report.bytes_compressed = 1000;
        assert_eq!(report.compression_percentage(), 0.0);

        report.bytes_compressed = 0;
        assert_eq!(report.compression_percentage(), 100.0);
    }

    #[test]
    fn test_warnings() {
        let mut report = CreationReport::new();
        report.add_warning("skipping special file fifo");
        assert!(report.has_warnings());
    }
}
