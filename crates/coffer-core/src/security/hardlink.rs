//! Hardlink target tracking during extraction.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;
use crate::types::DestDir;
use crate::types::SafePath;

/// Remembers which member names are backed by a file on disk.
///
/// A hardlink entry may only point at a member that appeared earlier in the
/// same archive and ended up on disk, either because it was written or
/// because it was already there and skipped. Every materialized file or
/// link is recorded under its normalized name and maps straight to its disk
/// path, so a chain `c -> b -> a` resolves with a single lookup.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::security::HardlinkTracker;
/// use coffer_core::types::DestDir;
/// use coffer_core::types::SafePath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
/// let mut tracker = HardlinkTracker::new();
/// let original = SafePath::new("data.bin")?;
/// tracker.record(&original, dest.join(original.as_path()));
///
/// let source = tracker.resolve("b.bin", "./data.bin", &dest)?;
/// assert!(source.ends_with("data.bin"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    on_disk: HashMap<PathBuf, PathBuf>,
}

impl HardlinkTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `name` is materialized at `disk_path`.
    pub fn record(&mut self, name: &SafePath, disk_path: PathBuf) {
        self.on_disk.insert(name.as_path().to_path_buf(), disk_path);
    }

    /// Returns `true` if `name` has been recorded.
    #[must_use]
    pub fn contains(&self, name: &Path) -> bool {
        self.on_disk.contains_key(name)
    }

    /// Validates a hardlink target and returns the disk path to link to.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsafePath`] if the target name is unsafe,
    /// or [`ArchiveError::MissingLinkTarget`] if it was never materialized.
    pub fn resolve(&self, link_name: &str, target: &str, dest: &DestDir) -> Result<PathBuf> {
        let target_path = SafePath::new(target).map_err(|err| match err {
            ArchiveError::UnsafePath { reason, .. } => ArchiveError::UnsafePath {
                path: PathBuf::from(format!("{link_name} -> {target}")),
                reason,
            },
            other => other,
        })?;

        match self.on_disk.get(target_path.as_path()) {
            Some(disk) if disk.starts_with(dest.as_path()) => Ok(disk.clone()),
            _ => Err(ArchiveError::MissingLinkTarget {
                path: PathBuf::from(link_name),
                target: PathBuf::from(target),
            }),
        }
    }

    /// Number of recorded names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.on_disk.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_disk.is_empty()
    }
}
