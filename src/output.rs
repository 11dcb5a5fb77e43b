// src/output.rs
// =============================================================================
// Helpers for the deployment target directory.
//
// Both deployers use full replacement: whatever was in the output directory
// before is deleted, never merged with the new build.
// =============================================================================

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{DeployError, DeployResult};

// Removes `path` recursively if it exists
//
// A plain file or symlink at `path` is removed too, so the caller can always
// create a fresh directory there afterwards.
pub fn remove_existing(path: &Path) -> DeployResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(DeployError::io(
                format!("inspect {}", path.display()),
                e,
            ))
        }
    };

    debug!(path = %path.display(), "removing previous output");

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| DeployError::io(format!("remove {}", path.display()), e))
}

// Destroys and recreates `path` as an empty directory
pub fn reset_dir(path: &Path) -> DeployResult<()> {
    remove_existing(path)?;
    fs::create_dir_all(path)
        .map_err(|e| DeployError::io(format!("create {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reset_dir_clears_previous_contents() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("output");
        fs::create_dir_all(out.join("old/nested")).unwrap();
        fs::write(out.join("old/nested/stale.html"), "stale").unwrap();

        reset_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_dir_replaces_plain_file() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("output");
        fs::write(&out, "not a directory").unwrap();

        reset_dir(&out).unwrap();

        assert!(out.is_dir());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(remove_existing(&temp.path().join("nope")).is_ok());
    }
}
