//! Validated extraction root.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

/// The directory archive entries are extracted into.
///
/// Holds an absolute, canonical path to an existing directory. All boundary
/// checks compare against this canonical form so that a root reached
/// through a symlink still works.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("out")?;
/// println!("extracting into {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Validates an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a directory, or
    /// cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let meta = std::fs::metadata(&path).map_err(|e| {
            ArchiveError::Io(io::Error::new(
                e.kind(),
                format!("destination directory {}: {e}", path.display()),
            ))
        })?;

        if !meta.is_dir() {
            return Err(ArchiveError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("destination is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            ArchiveError::Io(io::Error::new(
                e.kind(),
                format!("failed to canonicalize {}: {e}", path.display()),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Creates the directory (and missing ancestors) if needed, then
    /// validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or validated.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        Self::new(path)
    }

    /// Returns the canonical directory path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a relative path onto the root.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_directory() {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::new(temp.path()).unwrap();
        assert!(dest.as_path().is_absolute());
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(DestDir::new(temp.path().join("nope")).is_err());
    }

    #[test]
    fn test_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(DestDir::new(&file).is_err());
    }

    #[test]
    fn test_create_missing_ancestors() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        let dest = DestDir::create(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(dest.join("x"), nested.canonicalize().unwrap().join("x"));
    }
}
