//! Permission bit handling for extracted entries.

/// Mask applied to stored modes before they reach the filesystem.
pub const PERMISSION_MASK: u32 = 0o777;

/// Drops file type, setuid, setgid and sticky bits from a stored mode.
///
/// # Examples
///
/// ```
/// use coffer_core::security::sanitize_mode;
///
/// assert_eq!(sanitize_mode(0o104_755), 0o755);
/// assert_eq!(sanitize_mode(0o644), 0o644);
/// ```
#[must_use]
pub const fn sanitize_mode(mode: u32) -> u32 {
    mode & PERMISSION_MASK
}

/// Applies `mode` to `path`. A no-op on platforms without Unix permissions.
pub(crate) fn apply_mode(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(sanitize_mode(mode)))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_special_bits() {
        assert_eq!(sanitize_mode(0o4755), 0o755);
        assert_eq!(sanitize_mode(0o2755), 0o755);
        assert_eq!(sanitize_mode(0o1777), 0o777);
        assert_eq!(sanitize_mode(0o040_755), 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_mode() {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("f");
        std::fs::write(&file, b"x").unwrap();

        apply_mode(&file, 0o4600).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o600);
    }
}
