//! Configuration for archive creation.

use crate::ArchiveError;
use crate::NameFilter;
use crate::Result;
use crate::formats::ArchiveType;

/// Configuration for archive creation.
///
/// # Examples
///
/// ```
/// use coffer_core::creation::CreationConfig;
/// use coffer_core::formats::ArchiveType;
///
/// let config = CreationConfig::default()
///     .with_exclude_patterns(vec!["*.log".to_string()])
///     .with_compression_level(Some(9))
///     .with_format(Some(ArchiveType::TarGz));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationConfig {
    /// Descend into directory arguments. When off, a directory argument
    /// contributes only its own entry.
    pub recursive: bool,

    /// Base-name globs to leave out. A matching directory is pruned with
    /// its contents.
    pub exclude_patterns: Vec<String>,

    /// Base-name globs a file must match to be added. Empty means all.
    pub include_patterns: Vec<String>,

    /// Store repeated inodes as hardlinks when the container supports them.
    pub detect_hardlinks: bool,

    /// Compression level, 1 (fast) to 9 (best). 0 stores zip entries
    /// uncompressed. `None` uses the codec default.
    pub compression_level: Option<u8>,

    /// Archive type. `None` infers it from the output file name.
    pub format: Option<ArchiveType>,

    /// Replace an existing archive at the output path.
    pub overwrite: bool,
}

impl Default for CreationConfig {
    /// Default values:
    /// - `recursive`: `true`
    /// - `exclude_patterns`, `include_patterns`: empty
    /// - `detect_hardlinks`: `true`
    /// - `compression_level`: `None`
    /// - `format`: `None`
    /// - `overwrite`: `false`
    fn default() -> Self {
        Self {
            recursive: true,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
            detect_hardlinks: true,
            compression_level: None,
            format: None,
            overwrite: false,
        }
    }
}

impl CreationConfig {
    /// Creates a new `CreationConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether directory arguments are walked.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sets the exclude patterns.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Sets the include patterns.
    #[must_use]
    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    /// Sets hardlink detection.
    #[must_use]
    pub fn with_detect_hardlinks(mut self, detect: bool) -> Self {
        self.detect_hardlinks = detect;
        self
    }

    /// Sets the compression level. Checked by [`CreationConfig::validate`].
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the archive format.
    #[must_use]
    pub fn with_format(mut self, format: Option<ArchiveType>) -> Self {
        self.format = format;
        self
    }

    /// Sets whether an existing archive may be replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Compiles the include/exclude patterns.
    pub fn name_filter(&self) -> Result<NameFilter> {
        NameFilter::new(&self.exclude_patterns, &self.include_patterns)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is above 9, if level 0 is
    /// requested for a format that cannot store entries uncompressed, or if
    /// a pattern does not compile.
    pub fn validate(&self) -> Result<()> {
        match (self.compression_level, self.format) {
            (Some(level), _) if level > 9 => {
                return Err(ArchiveError::InvalidConfiguration {
                    reason: format!("compression level {level} is outside 0-9"),
                });
            }
            (Some(0), Some(ty)) if ty.compression().is_compressed() => {
                return Err(ArchiveError::InvalidConfiguration {
                    reason: format!("compression level 0 is not valid for {ty}"),
                });
            }
            _ => {}
        }
        self.name_filter().map(|_| ())
    }
}
