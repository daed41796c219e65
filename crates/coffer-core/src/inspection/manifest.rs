//! Archive manifest produced by listing.

use crate::formats::ArchiveType;
use crate::types::ArchiveEntry;
use crate::types::EntryKind;

/// Entries of an archive with running totals.
///
/// # Examples
///
/// ```
/// use coffer_core::inspection::ArchiveManifest;
/// use coffer_core::formats::ArchiveType;
/// use coffer_core::types::{ArchiveEntry, EntryKind};
///
/// let mut manifest = ArchiveManifest::new(ArchiveType::Tar);
/// manifest.add_entry(ArchiveEntry::new("a.txt", EntryKind::File, 10));
/// manifest.add_entry(ArchiveEntry::new("b.txt", EntryKind::File, 1024));
/// assert_eq!(manifest.total_entries, 2);
/// assert_eq!(manifest.total_size, 1034);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    /// Archive type that was read.
    pub format: ArchiveType,
    /// Entries in archive order.
    pub entries: Vec<ArchiveEntry>,
    /// Number of entries.
    pub total_entries: usize,
    /// Sum of uncompressed payload sizes.
    pub total_size: u64,
    /// Sum of stored payload sizes, for containers that record them.
    pub total_compressed: Option<u64>,
}

impl ArchiveManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub const fn new(format: ArchiveType) -> Self {
        Self {
            format,
            entries: Vec::new(),
            total_entries: 0,
            total_size: 0,
            total_compressed: None,
        }
    }

    /// Appends an entry and updates the totals.
    pub fn add_entry(&mut self, entry: ArchiveEntry) {
        self.total_entries += 1;
        self.total_size += entry.size;
        if let Some(compressed) = entry.compressed_size {
            self.total_compressed = Some(self.total_compressed.unwrap_or(0) + compressed);
        }
        self.entries.push(entry);
    }

    /// Number of entries of `kind`.
    #[must_use]
    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
