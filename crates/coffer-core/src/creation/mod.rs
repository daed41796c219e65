//! Archive creation: walk the inputs, then serialize them.

pub mod config;
pub mod creator;
pub mod report;
pub mod walker;
pub mod writer;

pub use config::CreationConfig;
pub use creator::ArchiveCreator;
pub use report::CreationReport;
pub use walker::WalkOutput;
pub use walker::collect_members;
pub use writer::with_default_extension;
pub use writer::write_archive;
