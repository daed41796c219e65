//! Configuration for reading archives: extraction, listing and testing.

use crate::NameFilter;
use crate::Result;
use crate::formats::ArchiveType;

/// Settings for extraction; listing and testing use the filter and format
/// fields only.
///
/// # Examples
///
/// ```
/// use coffer_core::ExtractionConfig;
///
/// let config = ExtractionConfig::default()
///     .with_overwrite(true)
///     .with_exclude_patterns(vec!["*.log".to_string()]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Replace existing non-directory targets. When off, such entries are
    /// skipped as [`crate::SkipReason::AlreadyExists`].
    pub overwrite: bool,

    /// Abort on the first unsafe member name instead of skipping it.
    pub strict_paths: bool,

    /// Apply stored permission bits (setuid, setgid and sticky removed).
    pub preserve_permissions: bool,

    /// Restore stored modification times.
    pub restore_mtime: bool,

    /// Base-name globs to leave out.
    pub exclude_patterns: Vec<String>,

    /// Base-name globs a file entry must match. Empty means all.
    pub include_patterns: Vec<String>,

    /// Archive type. `None` infers it from the archive file name.
    pub format: Option<ArchiveType>,
}

impl Default for ExtractionConfig {
    /// Default values:
    /// - `overwrite`: `false`
    /// - `strict_paths`: `false` (skip and warn)
    /// - `preserve_permissions`: `true`
    /// - `restore_mtime`: `true`
    /// - patterns: empty
    /// - `format`: `None`
    fn default() -> Self {
        Self {
            overwrite: false,
            strict_paths: false,
            preserve_permissions: true,
            restore_mtime: true,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
            format: None,
        }
    }
}

impl ExtractionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overwrite policy.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Makes unsafe member names fatal.
    #[must_use]
    pub fn with_strict_paths(mut self, strict: bool) -> Self {
        self.strict_paths = strict;
        self
    }

    /// Sets whether stored modes are applied.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets whether stored modification times are restored.
    #[must_use]
    pub fn with_restore_mtime(mut self, restore: bool) -> Self {
        self.restore_mtime = restore;
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

    /// Sets the archive type.
    #[must_use]
    pub fn with_format(mut self, format: Option<ArchiveType>) -> Self {
        self.format = format;
        self
    }

    /// Compiles the include/exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArchiveError::InvalidPattern`] for a malformed glob.
    pub fn name_filter(&self) -> Result<NameFilter> {
        NameFilter::new(&self.exclude_patterns, &self.include_patterns)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArchiveError::InvalidPattern`] if a pattern does
    /// not compile.
    pub fn validate(&self) -> Result<()> {
        self.name_filter().map(|_| ())
    }
}
