//! Filesystem operations behind each extraction [`Action`].
//!
//! [`Action`]: super::plan::Action

use std::collections::HashSet;
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use filetime::FileTime;

use crate::ArchiveError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_exact;
use crate::copy::expect_end;
use crate::types::DestDir;

/// Creates the missing ancestors of `target` and records them in `created`.
pub(crate) fn create_parents(
    target: &Path,
    dest: &DestDir,
    created: &mut HashSet<PathBuf>,
) -> io::Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };

    let missing: Vec<PathBuf> = parent
        .ancestors()
        .take_while(|dir| *dir != dest.as_path() && dir.symlink_metadata().is_err())
        .map(Path::to_path_buf)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent)?;
    created.extend(missing);
    Ok(())
}

/// Unlinks a non-directory at `target`. A symlink is removed, never
/// followed.
pub(crate) fn remove_existing(target: &Path) -> io::Result<()> {
    match fs::remove_file(target) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Writes exactly `size` payload bytes into a new file at `target`, then
/// makes sure the payload ends there.
///
/// The file is opened with `create_new`, so a link planted at `target`
/// after planning makes the write fail instead of being followed.
pub(crate) fn write_file(
    target: &Path,
    payload: &mut dyn Read,
    size: u64,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    let mut writer = BufWriter::new(file);
    let written = copy_exact(payload, &mut writer, size, buffer)?;
    expect_end(payload)?;
    writer.flush()?;
    Ok(written)
}

/// Creates a symlink at `link` pointing at the stored, unvalidated `target`.
pub(crate) fn create_symlink(target: &str, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = target;
        Err(ArchiveError::UnsupportedEntryKind {
            path: link.to_path_buf(),
            kind: "symlink".to_string(),
        })
    }
}

/// Creates a hardlink at `link` to an already extracted `source`.
pub(crate) fn create_hardlink(source: &Path, link: &Path) -> Result<()> {
    fs::hard_link(source, link).map_err(ArchiveError::Io)
}

/// Sets the modification time of `path` without following a symlink.
pub(crate) fn set_mtime(path: &Path, mtime: u64, is_symlink: bool) -> io::Result<()> {
    let time = FileTime::from_unix_time(i64::try_from(mtime).unwrap_or(i64::MAX), 0);
    if is_symlink {
        filetime::set_symlink_file_times(path, time, time)
    } else {
        filetime::set_file_mtime(path, time)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_parents_records_new_dirs_only() {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::new(temp.path()).unwrap();
        fs::create_dir(dest.join("a")).unwrap();

        let mut created = HashSet::new();
        create_parents(&dest.join("a/b/c/file"), &dest, &mut created).unwrap();

        assert!(dest.join("a/b/c").is_dir());
        assert!(created.contains(&dest.join("a/b")));
        assert!(created.contains(&dest.join("a/b/c")));
        assert!(!created.contains(&dest.join("a")));
    }

    #[test]
    fn test_write_file_exact_size() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out.bin");
        let mut buffer = CopyBuffer::new();
        let written = write_file(&target, &mut &b"abcdef"[..], 6, &mut buffer).unwrap();
        assert_eq!(written, 6);
        assert_eq!(fs::read(&target).unwrap(), b"abcdef");
    }

    #[test]
    fn test_write_file_short_payload_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("short.bin");
        let mut buffer = CopyBuffer::new();
        let err = write_file(&target, &mut &b"abc"[..], 10, &mut buffer).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptContainer(_)));
    }

    #[test]
    fn test_write_file_long_payload_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("long.bin");
        let mut buffer = CopyBuffer::new();
        let err = write_file(&target, &mut &b"abcdef"[..], 3, &mut buffer).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptContainer(_)));
    }

    #[test]
    fn test_write_file_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("exists");
        fs::write(&target, b"old").unwrap();
        let mut buffer = CopyBuffer::new();
        assert!(write_file(&target, &mut &b"new"[..], 3, &mut buffer).is_err());
        assert_eq!(fs::read(&target).unwrap(), b"old");
    }

    #[test]
    fn test_remove_existing_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        remove_existing(&temp.path().join("nope")).unwrap();
    }

    #[test]
    fn test_set_mtime() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("f");
        fs::write(&target, b"").unwrap();
        set_mtime(&target, 1_600_000_000, false).unwrap();
        let meta = fs::metadata(&target).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta).unix_seconds(), 1_600_000_000);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_mtime_does_not_touch_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        fs::write(&target, b"").unwrap();
        set_mtime(&target, 1_600_000_000, false).unwrap();

        let link = temp.path().join("link");
        create_symlink("target", &link).unwrap();
        set_mtime(&link, 1_500_000_000, true).unwrap();

        let target_meta = fs::metadata(&target).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&target_meta).unix_seconds(),
            1_600_000_000
        );
        let link_meta = fs::symlink_metadata(&link).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&link_meta).unix_seconds(),
            1_500_000_000
        );
    }
}
