//! Member walker: expands path and glob arguments into archive members.
//!
//! Arguments are processed in order. A glob argument is expanded against
//! the filesystem (`*` does not cross `/`, `**` does), directories are
//! walked in name order when recursion is on, filters are applied by base
//! name, and duplicates are dropped by resolved path with the first
//! occurrence winning. Symlinks are recorded, never followed.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use globset::GlobBuilder;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use crate::ArchiveError;
use crate::NameFilter;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::filter::has_glob_meta;
use crate::types::ArchiveMember;
use crate::types::EntryKind;

/// Members produced by the walker, plus anything worth telling the user.
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Members in archive order.
    pub members: Vec<ArchiveMember>,
    /// Non-fatal observations (stripped `..` prefixes, special files).
    pub warnings: Vec<String>,
}

/// Expands `inputs` into an ordered, duplicate-free member list.
///
/// `hardlinks` says whether the target container can store hardlinks; it
/// is combined with [`CreationConfig::detect_hardlinks`].
///
/// An empty result is not an error here; callers decide, and
/// [`crate::create_archive`] reports it as
/// [`ArchiveError::NothingToArchive`].
///
/// # Errors
///
/// - [`ArchiveError::InvalidPattern`] for a malformed glob.
/// - [`ArchiveError::WriteFailure`] if a literal path cannot be read or a
///   directory cannot be walked.
///
/// # Examples
///
/// ```no_run
/// use coffer_core::creation::CreationConfig;
/// use coffer_core::creation::walker::collect_members;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CreationConfig::default().with_exclude_patterns(vec!["*.log".into()]);
/// let walk = collect_members(&["src", "*.md"], &config, true)?;
/// for member in &walk.members {
///     println!("{}", member.name);
/// }
/// # Ok(())
/// # }
/// ```
pub fn collect_members<S: AsRef<str>>(
    inputs: &[S],
    config: &CreationConfig,
    hardlinks: bool,
) -> Result<WalkOutput> {
    let mut walker = MemberWalker {
        recursive: config.recursive,
        hardlinks: hardlinks && config.detect_hardlinks,
        filter: config.name_filter()?,
        seen: HashSet::new(),
        inodes: HashMap::new(),
        output: WalkOutput::default(),
    };

    for input in inputs {
        walker.add_argument(input.as_ref())?;
    }

    debug!(members = walker.output.members.len(), "walk finished");
    Ok(walker.output)
}

struct MemberWalker {
    recursive: bool,
    hardlinks: bool,
    filter: NameFilter,
    seen: HashSet<PathBuf>,
    inodes: HashMap<(u64, u64), String>,
    output: WalkOutput,
}

impl MemberWalker {
    fn add_argument(&mut self, arg: &str) -> Result<()> {
        if has_glob_meta(arg) {
            let matches = expand_glob(arg)?;
            if matches.is_empty() {
                debug!(pattern = arg, "pattern matched nothing");
            }
            for path in matches {
                self.add_root(&path)?;
            }
            Ok(())
        } else {
            self.add_root(Path::new(arg))
        }
    }

    fn add_root(&mut self, path: &Path) -> Result<()> {
        let meta = std::fs::symlink_metadata(path).map_err(|source| ArchiveError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;

        let (name, stripped) = archive_name(path);
        if stripped {
            let message = format!(
                "removing leading '../' from member names for {}",
                path.display()
            );
            warn!("{message}");
            self.output.warnings.push(message);
        }

        if !name.is_empty() {
            if !self.filter.allows(&name, meta.is_dir()) {
                debug!(name, "filtered");
                return Ok(());
            }
            self.push(path, &name, &meta)?;
        }

        if meta.is_dir() && self.recursive {
            self.descend(path, &name)?;
        }
        Ok(())
    }

    fn descend(&mut self, root: &Path, prefix: &str) -> Result<()> {
        let filter = self.filter.clone();
        let entries = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !filter.excludes_component(&e.file_name().to_string_lossy()));

        for entry in entries {
            let entry = entry.map_err(|err| ArchiveError::WriteFailure {
                path: err.path().unwrap_or(root).to_path_buf(),
                source: err.into(),
            })?;
            let meta = entry.metadata().map_err(|err| ArchiveError::WriteFailure {
                path: entry.path().to_path_buf(),
                source: err.into(),
            })?;

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let (tail, _) = archive_name(relative);
            let name = if prefix.is_empty() {
                tail
            } else {
                format!("{prefix}/{tail}")
            };

            if self.filter.allows(&name, meta.is_dir()) {
                self.push(entry.path(), &name, &meta)?;
            }
        }
        Ok(())
    }

    fn push(&mut self, path: &Path, name: &str, meta: &Metadata) -> Result<()> {
        if !self.seen.insert(dedup_key(path)) {
            debug!(name, "duplicate input skipped");
            return Ok(());
        }

        let file_type = meta.file_type();
        let (kind, size, link_target) = if file_type.is_symlink() {
            let target = std::fs::read_link(path).map_err(|source| ArchiveError::WriteFailure {
                path: path.to_path_buf(),
                source,
            })?;
            (
                EntryKind::Symlink,
                0,
                Some(target.to_string_lossy().into_owned()),
            )
        } else if file_type.is_dir() {
            (EntryKind::Directory, 0, None)
        } else if file_type.is_file() {
            match self.hardlink_target(name, meta) {
                Some(first) => (EntryKind::Hardlink, 0, Some(first)),
                None => (EntryKind::File, meta.len(), None),
            }
        } else {
            let message = format!("skipping special file {}", path.display());
            warn!("{message}");
            self.output.warnings.push(message);
            return Ok(());
        };

        let (mode, uid, gid) = ownership(meta);
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());

        debug!(name, %kind, size, "member");
        self.output.members.push(ArchiveMember {
            source: path.to_path_buf(),
            name: name.to_string(),
            kind,
            mode,
            mtime,
            link_target,
            size,
            uid,
            gid,
        });
        Ok(())
    }

    #[cfg(unix)]
    fn hardlink_target(&mut self, name: &str, meta: &Metadata) -> Option<String> {
        use std::collections::hash_map::Entry;
        use std::os::unix::fs::MetadataExt;

        if !self.hardlinks || meta.nlink() < 2 {
            return None;
        }
        match self.inodes.entry((meta.dev(), meta.ino())) {
            Entry::Occupied(first) => Some(first.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(name.to_string());
                None
            }
        }
    }

    #[cfg(not(unix))]
    fn hardlink_target(&mut self, _name: &str, _meta: &Metadata) -> Option<String> {
        None
    }
}

#[cfg(unix)]
fn ownership(meta: &Metadata) -> (u32, u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (
        meta.mode() & 0o7777,
        u64::from(meta.uid()),
        u64::from(meta.gid()),
    )
}

#[cfg(not(unix))]
fn ownership(meta: &Metadata) -> (u32, u64, u64) {
    let mode = if meta.is_dir() {
        0o755
    } else if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    (mode, 0, 0)
}

/// Turns a filesystem path into a relative `/`-separated member name.
///
/// Root and drive prefixes and `.` segments are dropped; `..` segments that
/// cannot be folded into a preceding component are dropped too, and the
/// second value reports that this happened.
pub fn archive_name(path: &Path) -> (String, bool) {
    let mut parts: Vec<String> = Vec::new();
    let mut stripped = false;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    stripped = true;
                }
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }

    (parts.join("/"), stripped)
}

/// Resolves the parent directory but not the leaf, so a symlink and its
/// target stay distinct members.
fn dedup_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(leaf)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map_or_else(|_| path.to_path_buf(), |p| p.join(leaf))
        }
        _ => path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Expands a glob against the filesystem, returning matches in sorted
/// order.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| ArchiveError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })?
        .compile_matcher();

    let mut base = PathBuf::new();
    let mut depth = 0usize;
    let mut unbounded = false;
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if depth == 0 && !has_glob_meta(&text) {
            base.push(component);
        } else {
            depth += 1;
            unbounded |= text == "**";
        }
    }

    let bare = base.as_os_str().is_empty();
    let root = if bare { PathBuf::from(".") } else { base };
    let mut walk = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if !unbounded {
        walk = walk.max_depth(depth);
    }

    let mut matches: Vec<PathBuf> = walk
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(|entry| {
            if bare {
                entry
                    .path()
                    .strip_prefix(".")
                    .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf)
            } else {
                entry.into_path()
            }
        })
        .filter(|candidate| matcher.is_match(candidate))
        .collect();
    matches.sort();
    Ok(matches)
}
