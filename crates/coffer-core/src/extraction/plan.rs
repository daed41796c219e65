//! Per-entry decisions, taken before anything on disk changes.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;
use crate::security::HardlinkTracker;
use crate::security::validate_path;
use crate::types::ArchiveEntry;
use crate::types::DestDir;
use crate::types::EntryKind;
use crate::types::SafePath;

/// What an entry turns into on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    CreateDirectory,
    WriteFile,
    CreateSymlink { target: String },
    CreateHardlink { source: PathBuf },
}

/// A validated entry ready to be materialized.
#[derive(Debug)]
pub(crate) struct Plan {
    pub(crate) safe: SafePath,
    pub(crate) target: PathBuf,
    pub(crate) action: Action,
    /// A non-directory already sits at `target` and must be unlinked first.
    pub(crate) replace: bool,
}

/// State carried from one entry to the next within a single extraction.
#[derive(Debug, Default)]
pub(crate) struct RunState {
    /// Disk paths created by this run, including implicit parents.
    pub(crate) created: HashSet<PathBuf>,
    /// Names that are backed by a file on disk, for hardlink resolution.
    pub(crate) links: HardlinkTracker,
}

/// Validates `entry` and decides how to materialize it.
///
/// The name is checked first, then the kind, then what is already on disk.
/// An existing directory is reused for a directory entry if it was created
/// by this run or overwrite is on; any other directory in the way is a
/// conflict. An existing non-directory is replaced if it was created by this
/// run or overwrite is on.
pub(crate) fn plan_entry(
    entry: &ArchiveEntry,
    dest: &DestDir,
    state: &RunState,
    overwrite: bool,
) -> Result<Plan> {
    let safe = validate_path(&entry.name, dest)?;
    let target = dest.join(safe.as_path());

    let missing_target = || ArchiveError::MissingLinkTarget {
        path: PathBuf::from(&entry.name),
        target: PathBuf::new(),
    };

    let action = match entry.kind {
        EntryKind::Directory => Action::CreateDirectory,
        EntryKind::File => Action::WriteFile,
        EntryKind::Symlink => Action::CreateSymlink {
            target: entry
                .link_target
                .clone()
                .filter(|t| !t.is_empty())
                .ok_or_else(missing_target)?,
        },
        EntryKind::Hardlink => {
            let link = entry
                .link_target
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(missing_target)?;
            let source = state.links.resolve(&entry.name, link, dest)?;
            if source == target {
                return Err(ArchiveError::AlreadyExists { path: target });
            }
            Action::CreateHardlink { source }
        }
        EntryKind::Other(_) => {
            return Err(ArchiveError::UnsupportedEntryKind {
                path: PathBuf::from(&entry.name),
                kind: entry.kind.to_string(),
            });
        }
    };

    let replace = match std::fs::symlink_metadata(&target) {
        Ok(meta) => {
            let ours = state.created.contains(&target);
            match (meta.is_dir(), &action) {
                (true, Action::CreateDirectory) if ours || overwrite => false,
                (false, _) if ours || overwrite => true,
                _ => return Err(ArchiveError::AlreadyExists { path: target }),
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(ArchiveError::Io(e)),
    };

    Ok(Plan {
        safe,
        target,
        action,
        replace,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DestDir) {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::new(temp.path()).unwrap();
        (temp, dest)
    }

    #[test]
    fn test_plan_new_file() {
        let (_temp, dest) = setup();
        let entry = ArchiveEntry::new("a/b.txt", EntryKind::File, 3);
        let plan = plan_entry(&entry, &dest, &RunState::default(), false).unwrap();
        assert_eq!(plan.action, Action::WriteFile);
        assert_eq!(plan.target, dest.join("a/b.txt"));
        assert!(!plan.replace);
    }

    #[test]
    fn test_existing_file_conflicts_without_overwrite() {
        let (temp, dest) = setup();
        fs::write(temp.path().join("x"), b"old").unwrap();
        let entry = ArchiveEntry::new("x", EntryKind::File, 3);

        let err = plan_entry(&entry, &dest, &RunState::default(), false).unwrap_err();
        assert!(matches!(err, ArchiveError::AlreadyExists { .. }));

        let plan = plan_entry(&entry, &dest, &RunState::default(), true).unwrap();
        assert!(plan.replace);
    }

    #[test]
    fn test_paths_from_this_run_are_not_conflicts() {
        let (temp, dest) = setup();
        fs::create_dir(temp.path().join("d")).unwrap();
        fs::write(temp.path().join("f"), b"").unwrap();

        let mut state = RunState::default();
        state.created.insert(dest.join("d"));
        state.created.insert(dest.join("f"));

        let dir = ArchiveEntry::new("d/", EntryKind::Directory, 0);
        assert!(!plan_entry(&dir, &dest, &state, false).unwrap().replace);

        let file = ArchiveEntry::new("f", EntryKind::File, 0);
        assert!(plan_entry(&file, &dest, &state, false).unwrap().replace);
    }

    #[test]
    fn test_directory_in_the_way_of_file() {
        let (temp, dest) = setup();
        fs::create_dir(temp.path().join("d")).unwrap();
        let entry = ArchiveEntry::new("d", EntryKind::File, 0);
        let err = plan_entry(&entry, &dest, &RunState::default(), true).unwrap_err();
        assert!(matches!(err, ArchiveError::AlreadyExists { .. }));
    }

    #[test]
    fn test_unsafe_name_is_rejected_first() {
        let (_temp, dest) = setup();
        let entry = ArchiveEntry::new("../evil", EntryKind::Other(b'6'), 0);
        let err = plan_entry(&entry, &dest, &RunState::default(), false).unwrap_err();
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_other_kind_unsupported() {
        let (_temp, dest) = setup();
        let entry = ArchiveEntry::new("fifo", EntryKind::Other(b'6'), 0);
        let err = plan_entry(&entry, &dest, &RunState::default(), false).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedEntryKind { .. }));
    }

    #[test]
    fn test_hardlink_needs_earlier_member() {
        let (_temp, dest) = setup();
        let mut entry = ArchiveEntry::new("b", EntryKind::Hardlink, 0);
        entry.link_target = Some("a".into());

        let mut state = RunState::default();
        let err = plan_entry(&entry, &dest, &state, false).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingLinkTarget { .. }));

        let a = SafePath::new("a").unwrap();
        state.links.record(&a, dest.join("a"));
        let plan = plan_entry(&entry, &dest, &state, false).unwrap();
        assert_eq!(
            plan.action,
            Action::CreateHardlink {
                source: dest.join("a")
            }
        );
    }

    #[test]
    fn test_symlink_without_target() {
        let (_temp, dest) = setup();
        let entry = ArchiveEntry::new("l", EntryKind::Symlink, 0);
        let err = plan_entry(&entry, &dest, &RunState::default(), false).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingLinkTarget { .. }));
    }
}
