//! Extraction engine: turns decoded entries into files under a root.

use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::warn;

use super::materialize;
use super::plan::Action;
use super::plan::RunState;
use super::plan::plan_entry;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::NameFilter;
use crate::Result;
use crate::SkipReason;
use crate::copy::CopyBuffer;
use crate::report::ProgressTracker;
use crate::security::permissions::apply_mode;
use crate::security::sanitize_mode;
use crate::types::ArchiveEntry;
use crate::types::DestDir;
use crate::types::SafePath;

struct DeferredDir {
    path: PathBuf,
    mode: u32,
    mtime: u64,
}

/// Materializes entries one at a time, in archive order.
///
/// Each entry goes through the name filter, the path validator and the
/// conflict check before anything is written. Safety violations, conflicts,
/// unsupported kinds and dangling hardlinks are recorded as skips; any
/// other error aborts. Directory modes and times are applied by
/// [`ExtractionEngine::finish`], after every child has been written.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::extraction::ExtractionEngine;
/// use coffer_core::report::ProgressTracker;
/// use coffer_core::types::{ArchiveEntry, DestDir, EntryKind};
/// use coffer_core::{ExtractionConfig, NoopProgress};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let mut engine = ExtractionEngine::new(DestDir::create("out")?, &config)?;
/// let mut progress = NoopProgress;
/// let mut tracker = ProgressTracker::new(&mut progress, 0);
///
/// let entry = ArchiveEntry::new("hello.txt", EntryKind::File, 5);
/// engine.process(&entry, &mut &b"hello"[..], &mut tracker)?;
/// let report = engine.finish();
/// assert_eq!(report.files_extracted, 1);
/// # Ok(())
/// # }
/// ```
pub struct ExtractionEngine<'a> {
    dest: DestDir,
    config: &'a ExtractionConfig,
    filter: NameFilter,
    state: RunState,
    deferred: Vec<DeferredDir>,
    buffer: CopyBuffer,
    report: ExtractionReport,
    started: Instant,
}

impl<'a> ExtractionEngine<'a> {
    /// Creates an engine extracting into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArchiveError::InvalidPattern`] if a filter pattern does
    /// not compile.
    pub fn new(dest: DestDir, config: &'a ExtractionConfig) -> Result<Self> {
        Ok(Self {
            dest,
            filter: config.name_filter()?,
            config,
            state: RunState::default(),
            deferred: Vec::new(),
            buffer: CopyBuffer::new(),
            report: ExtractionReport::new(),
            started: Instant::now(),
        })
    }

    /// Processes one entry. `payload` must be positioned at the start of
    /// the entry's data.
    ///
    /// # Errors
    ///
    /// Returns fatal errors only: corrupt payloads, filesystem failures,
    /// and unsafe names when `strict_paths` is on.
    pub fn process(
        &mut self,
        entry: &ArchiveEntry,
        payload: &mut dyn Read,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<()> {
        let name = Path::new(&entry.name);
        progress.on_entry_start(name);

        if entry.kind.is_directory() && SafePath::names_root(&entry.name) {
            debug!(entry = %entry.name, "root directory entry");
            progress.on_entry_complete(name);
            return Ok(());
        }

        if !self.filter.allows(&entry.name, entry.kind.is_directory()) {
            debug!(entry = %entry.name, "filtered");
            self.report
                .record_skip(&entry.name, SkipReason::Filtered, String::new());
            progress.on_entry_skipped(name, SkipReason::Filtered);
            return Ok(());
        }

        match self.materialize(entry, payload) {
            Ok(bytes) => {
                debug!(entry = %entry.name, kind = %entry.kind, bytes, "extracted");
                progress.on_bytes_written(bytes);
                progress.on_entry_complete(name);
                Ok(())
            }
            Err(err) if err.is_security_violation() && self.config.strict_paths => Err(err),
            Err(err) => match SkipReason::from_error(&err) {
                Some(reason) => {
                    warn!(entry = %entry.name, "skipping: {err}");
                    if reason == SkipReason::AlreadyExists {
                        self.remember_existing(entry);
                    }
                    self.report.record_skip(&entry.name, reason, err.to_string());
                    progress.on_entry_skipped(name, reason);
                    Ok(())
                }
                None => Err(err),
            },
        }
    }

    /// Applies deferred directory metadata and returns the report.
    #[must_use]
    pub fn finish(mut self) -> ExtractionReport {
        let deferred = std::mem::take(&mut self.deferred);
        for dir in deferred.iter().rev() {
            if self.config.preserve_permissions
                && let Err(err) = apply_mode(&dir.path, dir.mode)
            {
                self.best_effort("mode", &dir.path, &err);
            }
            if self.config.restore_mtime
                && let Err(err) = materialize::set_mtime(&dir.path, dir.mtime, false)
            {
                self.best_effort("modification time", &dir.path, &err);
            }
        }

        self.report.duration = self.started.elapsed();
        self.report
    }

    fn materialize(&mut self, entry: &ArchiveEntry, payload: &mut dyn Read) -> Result<u64> {
        let plan = plan_entry(entry, &self.dest, &self.state, self.config.overwrite)?;
        if plan.replace {
            materialize::remove_existing(&plan.target)?;
        }

        let mode = sanitize_mode(entry.effective_mode());
        let mut bytes = 0;

        if plan.action == Action::CreateDirectory {
            materialize::create_parents(&plan.target, &self.dest, &mut self.state.created)?;
            std::fs::create_dir_all(&plan.target)?;
            self.state.created.insert(plan.target.clone());
            self.deferred.push(DeferredDir {
                path: plan.target,
                mode,
                mtime: entry.mtime,
            });
            self.report.directories_created += 1;
            return Ok(0);
        }

        materialize::create_parents(&plan.target, &self.dest, &mut self.state.created)?;
        match &plan.action {
            Action::WriteFile => {
                bytes =
                    materialize::write_file(&plan.target, payload, entry.size, &mut self.buffer)?;
                self.report.files_extracted += 1;
                self.report.bytes_written += bytes;
                if self.config.preserve_permissions
                    && let Err(err) = apply_mode(&plan.target, mode)
                {
                    self.best_effort("mode", &plan.target, &err);
                }
            }
            Action::CreateSymlink { target } => {
                materialize::create_symlink(target, &plan.target)?;
                self.report.symlinks_created += 1;
            }
            Action::CreateHardlink { source } => {
                materialize::create_hardlink(source, &plan.target)?;
                self.report.hardlinks_created += 1;
            }
            Action::CreateDirectory => {}
        }

        self.state.created.insert(plan.target.clone());
        self.state.links.record(&plan.safe, plan.target.clone());

        // A hardlink shares its inode with the source; its time is already
        // the source's.
        if self.config.restore_mtime && !matches!(plan.action, Action::CreateHardlink { .. }) {
            let is_symlink = matches!(plan.action, Action::CreateSymlink { .. });
            if let Err(err) = materialize::set_mtime(&plan.target, entry.mtime, is_symlink) {
                self.best_effort("modification time", &plan.target, &err);
            }
        }

        Ok(bytes)
    }

    /// A file left in place still backs later hardlinks to its name.
    fn remember_existing(&mut self, entry: &ArchiveEntry) {
        if entry.kind.is_directory() {
            return;
        }
        if let Ok(safe) = SafePath::new(&entry.name) {
            let disk = self.dest.join(safe.as_path());
            self.state.links.record(&safe, disk);
        }
    }

    fn best_effort(&mut self, what: &str, path: &Path, err: &io::Error) {
        let message = format!("cannot restore {what} of {}: {err}", path.display());
        warn!("{message}");
        self.report.add_warning(message);
    }
}
