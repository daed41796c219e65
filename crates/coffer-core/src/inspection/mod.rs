//! Read-only archive operations: listing and integrity checks.

pub mod list;
pub mod manifest;
pub mod verify;

pub use list::list_archive;
pub use manifest::ArchiveManifest;
pub use verify::EntryFailure;
pub use verify::VerificationReport;
pub use verify::verify_archive;
