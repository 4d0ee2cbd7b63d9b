//! Path validation (spec.md §4.1 `validateFilePath`).

use crate::error::GatewayError;
use devgate_commons::paths::{is_within, normalize_path, AllowedBases};
use std::path::{Path, PathBuf};

/// Obvious secret locations rejected regardless of allowed-base membership.
const DENYLIST: &[&str] = &["/etc/passwd", "/etc/shadow", "/.ssh/", "/id_rsa", "/.env"];

/// System directories that may be read but never written.
const SYSTEM_DIRS: &[&str] = &["/bin", "/sbin", "/usr", "/System", "/Library"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    Read,
    Write,
}

/// Resolve and validate `raw_path` for the given operation against the
/// currently active set of allowed bases.
///
/// Returns the resolved, normalized absolute path on success. Never touches
/// the filesystem: normalization is purely lexical, matching spec.md's
/// invariant that `resolve(p)` is "absolute, normalized" without requiring
/// the path to exist yet (needed for `smart_edit` creating new files).
pub fn validate_file_path(
    raw_path: &str,
    op: PathOp,
    allowed_bases: &AllowedBases,
) -> Result<PathBuf, GatewayError> {
    if raw_path.trim().is_empty() {
        return Err(GatewayError::invalid_input("path must be a non-empty string"));
    }

    let resolved = normalize_path(Path::new(raw_path));
    if !resolved.is_absolute() {
        return Err(GatewayError::invalid_input(format!(
            "path `{raw_path}` must be absolute"
        )));
    }

    let resolved_str = resolved.to_string_lossy();
    for denied in DENYLIST {
        if resolved_str.contains(denied) {
            return Err(GatewayError::path_denied(format!(
                "access to `{raw_path}` is not allowed"
            )));
        }
    }

    if allowed_bases.matching_base(&resolved).is_none() {
        return Err(GatewayError::path_denied(format!(
            "path `{raw_path}` is not allowed"
        )));
    }

    if op == PathOp::Write {
        for system_dir in SYSTEM_DIRS {
            if is_within(&resolved, Path::new(system_dir)) {
                return Err(GatewayError::path_denied(format!(
                    "writes to system directory `{system_dir}` are not allowed"
                )));
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bases() -> AllowedBases {
        AllowedBases::new([PathBuf::from("/home/user"), PathBuf::from("/tmp")])
    }

    #[test]
    fn rejects_empty_path() {
        assert!(validate_file_path("", PathOp::Read, &bases()).is_err());
    }

    #[test]
    fn rejects_denylisted_secret_locations() {
        let wide_open = AllowedBases::new([PathBuf::from("/")]);
        assert!(validate_file_path("/etc/passwd", PathOp::Read, &wide_open).is_err());
        assert!(validate_file_path("/home/user/.ssh/id_rsa", PathOp::Read, &wide_open).is_err());
    }

    #[test]
    fn rejects_path_outside_allowed_bases() {
        assert!(validate_file_path("/opt/other", PathOp::Read, &bases()).is_err());
    }

    #[test]
    fn accepts_nested_path_within_allowed_base() {
        let resolved =
            validate_file_path("/home/user/proj/a.js", PathOp::Read, &bases()).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/user/proj/a.js"));
    }

    #[test]
    fn traversal_is_neutralized_by_normalization() {
        let resolved =
            validate_file_path("/home/user/proj/../proj/a.js", PathOp::Read, &bases()).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/user/proj/a.js"));
    }

    #[test]
    fn rejects_write_under_system_directory() {
        let wide_open = AllowedBases::new([PathBuf::from("/")]);
        assert!(validate_file_path("/usr/local/bin/tool", PathOp::Write, &wide_open).is_err());
    }

    #[test]
    fn allows_read_under_system_directory() {
        let wide_open = AllowedBases::new([PathBuf::from("/")]);
        assert!(validate_file_path("/usr/local/bin/tool", PathOp::Read, &wide_open).is_ok());
    }

    #[test]
    fn sibling_directory_with_shared_prefix_is_denied() {
        let bases = AllowedBases::new([PathBuf::from("/home/user")]);
        assert!(validate_file_path("/home/userA/secret", PathOp::Read, &bases).is_err());
    }
}
