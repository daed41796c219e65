//! Core types for archive members and validated paths.

mod dest_dir;
mod member;
mod safe_path;

pub use dest_dir::DestDir;
pub use member::ArchiveEntry;
pub use member::ArchiveMember;
pub use member::EntryKind;
pub use member::StorageMethod;
pub use safe_path::SafePath;
