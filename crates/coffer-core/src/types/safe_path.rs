//! Validated relative path for archive members.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::PathViolation;
use crate::Result;

/// A member name that passed syntactic validation.
///
/// `SafePath` is always relative, never empty, and contains only normal
/// components: `.` segments and repeated separators are collapsed away, and
/// any `..` segment, absolute prefix or NUL byte is rejected.
///
/// There is no `From<PathBuf>`; the only constructors validate.
///
/// # Examples
///
/// ```
/// use coffer_core::types::SafePath;
///
/// let safe = SafePath::new("./docs//guide.md")?;
/// assert_eq!(safe.to_archive_name(), "docs/guide.md");
///
/// assert!(SafePath::new("../../etc/passwd").is_err());
/// assert!(SafePath::new("/etc/passwd").is_err());
/// # Ok::<(), coffer_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Normalizes `name` and rejects anything that could leave the root.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsafePath`] naming the violated rule.
    pub fn new(name: &str) -> Result<Self> {
        let reject = |reason| ArchiveError::UnsafePath {
            path: PathBuf::from(name),
            reason,
        };

        if name.contains('\0') {
            return Err(reject(PathViolation::NullByte));
        }

        let mut normalized = PathBuf::new();
        for component in Path::new(name).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(reject(PathViolation::Absolute));
                }
                Component::ParentDir => return Err(reject(PathViolation::ParentTraversal)),
                Component::CurDir => {}
                Component::Normal(part) => normalized.push(part),
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(reject(PathViolation::Empty));
        }

        Ok(Self(normalized))
    }

    /// Returns `true` if `name` spells the archive root itself, as in the
    /// `./` entry that `tar -cf x.tar .` writes first.
    ///
    /// Such a name has no [`SafePath`]; callers treat a directory entry with
    /// it as already present.
    #[must_use]
    pub fn names_root(name: &str) -> bool {
        let mut components = Path::new(name).components().peekable();
        components.peek().is_some() && components.all(|c| c == Component::CurDir)
    }

    /// Returns the normalized relative path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consumes the `SafePath` and returns the inner `PathBuf`.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Renders the path with `/` separators, as archives store names.
    #[must_use]
    pub fn to_archive_name(&self) -> String {
        self.0
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
