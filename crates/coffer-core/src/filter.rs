//! Base-name glob filters shared by create, list, test and extract.
//!
//! Patterns are matched against the base name of an entry, never its full
//! path. An entry whose base name matches an exclude pattern is dropped.
//! When include patterns are present, a non-directory entry is kept only if
//! its base name matches one of them; directories are never dropped by
//! include patterns.
//!
//! Excluding a directory name does not drop the members stored under it.
//! Only the creation walker prunes excluded directories, since it decides
//! what enters the archive in the first place.

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;

use crate::ArchiveError;
use crate::Result;

/// Compiled include and exclude patterns.
///
/// # Examples
///
/// ```
/// use coffer_core::NameFilter;
///
/// let filter = NameFilter::new(&["*.log".to_string()], &[])?;
/// assert!(filter.allows("a.txt", false));
/// assert!(!filter.allows("logs/a.log", false));
/// # Ok::<(), coffer_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    exclude: Option<GlobSet>,
    include: Option<GlobSet>,
}

impl NameFilter {
    /// Compiles the pattern lists. Empty lists disable that side.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidPattern`] for a malformed glob.
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self> {
        Ok(Self {
            exclude: compile(exclude)?,
            include: compile(include)?,
        })
    }

    /// Returns `true` if no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exclude.is_none() && self.include.is_none()
    }

    /// Returns `true` if a base name matches an exclude pattern.
    #[must_use]
    pub fn excludes_component(&self, component: &str) -> bool {
        self.exclude.as_ref().is_some_and(|set| set.is_match(component))
    }

    /// Decides whether an entry named `name` (`/`-separated) is kept.
    #[must_use]
    pub fn allows(&self, name: &str, is_dir: bool) -> bool {
        let base = base_name(name);
        if self.excludes_component(base) {
            return false;
        }
        if is_dir {
            return true;
        }
        self.include.as_ref().is_none_or(|set| set.is_match(base))
    }
}

/// Last non-empty component of a `/`-separated member name.
fn base_name(name: &str) -> &str {
    name.rsplit('/')
        .find(|c| !c.is_empty() && *c != ".")
        .unwrap_or("")
}

fn compile(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ArchiveError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.kind().to_string(),
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| ArchiveError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })
}

/// Returns `true` if `arg` contains a glob metacharacter.
#[must_use]
pub fn has_glob_meta(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = NameFilter::default();
        assert!(filter.is_empty());
        assert!(filter.allows("a/b/c.txt", false));
    }

    #[test]
    fn test_exclude_by_base_name() {
        let filter = NameFilter::new(&patterns(&["*.log"]), &[]).unwrap();
        assert!(filter.allows("a.txt", false));
        assert!(!filter.allows("a.log", false));
        assert!(!filter.allows("deep/dir/a.log", false));
    }

    #[test]
    fn test_exclude_ignores_parent_directories() {
        let filter = NameFilter::new(&patterns(&["*.log"]), &[]).unwrap();
        assert!(!filter.allows("build.log/", true));
        assert!(filter.allows("build.log/keep.txt", false));
        assert!(!filter.allows("build.log/inner.log", false));
    }

    #[test]
    fn test_base_name_skips_trailing_separators() {
        assert_eq!(base_name("target/"), "target");
        assert_eq!(base_name("a/b/./"), "b");
        assert_eq!(base_name("./"), "");
    }

    #[test]
    fn test_include_only_applies_to_files() {
        let filter = NameFilter::new(&[], &patterns(&["*.rs"])).unwrap();
        assert!(filter.allows("src/", true));
        assert!(filter.allows("src/lib.rs", false));
        assert!(!filter.allows("src/README.md", false));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = NameFilter::new(&patterns(&["skip*"]), &patterns(&["*.txt"])).unwrap();
        assert!(filter.allows("keep.txt", false));
        assert!(!filter.allows("skip.txt", false));
    }

    #[test]
    fn test_pattern_does_not_match_full_path() {
        let filter = NameFilter::new(&patterns(&["dir/*.txt"]), &[]).unwrap();
        assert!(filter.allows("dir/a.txt", false));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = NameFilter::new(&patterns(&["[unclosed"]), &[]).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidPattern { .. }));
    }

    #[test]
    fn test_glob_meta_detection() {
        assert!(has_glob_meta("*.txt"));
        assert!(has_glob_meta("file?.rs"));
        assert!(has_glob_meta("[ab].c"));
        assert!(!has_glob_meta("plain/path.txt"));
    }
}
