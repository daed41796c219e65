//! Path safety checks applied before anything touches the filesystem.

pub mod hardlink;
pub mod path;
pub mod permissions;

pub use hardlink::HardlinkTracker;
pub use path::validate_path;
pub use permissions::sanitize_mode;
