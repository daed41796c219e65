//! Builder for creating archives with a fluent API.

use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::creation::report::CreationReport;
use crate::formats::ArchiveType;

/// Builder for creating archives.
///
/// Sources are kept as strings so glob arguments reach the walker
/// unexpanded.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::creation::ArchiveCreator;
///
/// let report = ArchiveCreator::new()
///     .output("backup.tar.gz")
///     .add_source("src")
///     .add_source("*.toml")
///     .exclude("*.log")
///     .compression_level(9)
///     .create()?;
///
/// println!("Created archive with {} files", report.files_added);
/// # Ok::<(), coffer_core::ArchiveError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveCreator {
    output_path: Option<PathBuf>,
    sources: Vec<String>,
    config: CreationConfig,
}

impl ArchiveCreator {
    /// Creates a new `ArchiveCreator` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive path. The format is inferred from its
    /// extension unless [`ArchiveCreator::format`] is called.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a path or glob argument.
    #[must_use]
    pub fn add_source<S: Into<String>>(mut self, source: S) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Adds several path or glob arguments.
    #[must_use]
    pub fn sources<S: AsRef<str>>(mut self, sources: &[S]) -> Self {
        self.sources
            .extend(sources.iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: CreationConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the compression level (0-9).
    #[must_use]
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config.compression_level = Some(level);
        self
    }

    /// Adds an exclude pattern.
    ///
    /// ```
    /// use coffer_core::creation::ArchiveCreator;
    ///
    /// let creator = ArchiveCreator::new().exclude("*.log").exclude("target");
    /// ```
    #[must_use]
    pub fn exclude<S: Into<String>>(mut self, pattern: S) -> Self {
        self.config.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds an include pattern.
    #[must_use]
    pub fn include<S: Into<String>>(mut self, pattern: S) -> Self {
        self.config.include_patterns.push(pattern.into());
        self
    }

    /// Sets whether directory arguments are walked.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    /// Sets an explicit archive format.
    #[must_use]
    pub fn format(mut self, format: ArchiveType) -> Self {
        self.config.format = Some(format);
        self
    }

    /// Allows replacing an existing archive.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Creates the archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidConfiguration`] if no output or no
    /// source was given, and otherwise whatever
    /// [`crate::create_archive`] returns.
    pub fn create(self) -> Result<CreationReport> {
        self.create_with_progress(&mut NoopProgress)
    }

    /// Creates the archive, reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// See [`ArchiveCreator::create`].
    pub fn create_with_progress(
        self,
        progress: &mut dyn ProgressCallback,
    ) -> Result<CreationReport> {
        let output_path = self
            .output_path
            .ok_or_else(|| ArchiveError::InvalidConfiguration {
                reason: "output path not set".to_string(),
            })?;

        if self.sources.is_empty() {
            return Err(ArchiveError::InvalidConfiguration {
                reason: "no source paths provided".to_string(),
            });
        }

        crate::api::create_archive_with_progress(
            &output_path,
            &self.sources,
            &self.config,
            progress,
        )
    }
}
