//! Path traversal validation.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::PathViolation;
use crate::Result;
use crate::types::DestDir;
use crate::types::SafePath;

/// Validates an untrusted member name against the extraction root.
///
/// Runs the syntactic checks of [`SafePath::new`] and then makes sure the
/// nearest existing ancestor of the target resolves inside `dest`. The
/// second step catches escapes through symlinks materialized by earlier
/// entries (`link -> /etc` followed by `link/passwd`).
///
/// The target itself is not resolved, so an existing symlink at the target
/// location does not cause a rejection.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsafePath`] on any violation, or
/// [`ArchiveError::Io`] if an ancestor cannot be inspected.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::security::validate_path;
/// use coffer_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp")?;
/// assert!(validate_path("foo/bar.txt", &dest).is_ok());
/// assert!(validate_path("../etc/passwd", &dest).is_err());
/// # Ok(())
/// # }
/// ```
pub fn validate_path(name: &str, dest: &DestDir) -> Result<SafePath> {
    let safe = SafePath::new(name)?;
    ensure_within_root(dest, safe.as_path(), name)?;
    Ok(safe)
}

fn ensure_within_root(dest: &DestDir, relative: &Path, name: &str) -> Result<()> {
    let escape = || ArchiveError::UnsafePath {
        path: PathBuf::from(name),
        reason: PathViolation::EscapesRoot,
    };

    let target = dest.join(relative);
    let mut ancestor = target.parent();

    while let Some(dir) = ancestor {
        match dir.canonicalize() {
            Ok(canonical) => {
                if canonical.starts_with(dest.as_path()) {
                    return Ok(());
                }
                return Err(escape());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // A dangling symlink also reports NotFound; it must not be
                // walked past.
                if dir.symlink_metadata().is_ok() {
                    return Err(escape());
                }
                ancestor = dir.parent();
            }
            Err(e) => return Err(ArchiveError::Io(e)),
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        (temp, dest)
    }

    #[test]
    fn test_validate_path_valid() {
        let (_temp, dest) = create_test_dest();
        assert!(validate_path("foo/bar.txt", &dest).is_ok());
    }

    #[test]
    fn test_validate_path_traversal() {
        let (_temp, dest) = create_test_dest();
        let err = validate_path("../etc/passwd", &dest).unwrap_err();
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_validate_path_absolute() {
        let (_temp, dest) = create_test_dest();
        assert!(validate_path("/etc/passwd", &dest).is_err());
    }

    #[test]
    fn test_validate_path_nested_missing_parents() {
        let (_temp, dest) = create_test_dest();
        let safe = validate_path("foo/bar/baz/file.txt", &dest).unwrap();
        assert_eq!(safe.as_path(), Path::new("foo/bar/baz/file.txt"));
    }

    #[test]
    fn test_validate_path_current_dir() {
        let (_temp, dest) = create_test_dest();
        let safe = validate_path("./foo/bar.txt", &dest).unwrap();
        assert_eq!(safe.as_path(), Path::new("foo/bar.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_escape_through_symlink() {
        let (temp, dest) = create_test_dest();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();

        match validate_path("link/passwd", &dest) {
            Err(ArchiveError::UnsafePath { reason, .. }) => {
                assert_eq!(reason, PathViolation::EscapesRoot);
            }
            other => panic!("expected escape, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_dangling_symlink_ancestor() {
        let (temp, dest) = create_test_dest();
        std::os::unix::fs::symlink("/nonexistent/coffer", temp.path().join("dangling")).unwrap();
        assert!(validate_path("dangling/x/y", &dest).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_allows_internal_symlink() {
        let (temp, dest) = create_test_dest();
        std::fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink("real", temp.path().join("alias")).unwrap();
        assert!(validate_path("alias/file.txt", &dest).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_symlink_target_itself_is_not_resolved() {
        let (temp, dest) = create_test_dest();
        std::os::unix::fs::symlink("/etc", temp.path().join("etc-link")).unwrap();
        assert!(validate_path("etc-link", &dest).is_ok());
    }
}
