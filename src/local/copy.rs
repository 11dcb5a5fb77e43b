// src/local/copy.rs
// =============================================================================
// Recursive directory copy that keeps symbolic links as links.
//
// How it works:
// 1. Walk the source tree with walkdir (parents are always visited before
//    their children, so target directories exist when we need them)
// 2. Recreate each entry under the destination at the same relative path
// 3. Symlinks are read with read_link() and recreated pointing at the same
//    target; they are never followed
// =============================================================================

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{DeployError, DeployResult};

// Copies everything below `source` into `dest`
//
// `dest` is created if needed. Returns the number of entries (files,
// directories and links) written below it.
pub fn copy_tree(source: &Path, dest: &Path) -> DeployResult<usize> {
    fs::create_dir_all(dest)
        .map_err(|e| DeployError::io(format!("create {}", dest.display()), e))?;

    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(false).min_depth(1) {
        let entry = entry?;
        // docs-build/sub/b.html -> sub/b.html
        let relative = entry.path().strip_prefix(source).map_err(|e| {
            DeployError::io(
                "resolve relative path",
                io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
            )
        })?;
        let target = dest.join(relative);
        // file_type() describes the entry itself, not what a link points to
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| {
                DeployError::io(format!("read link {}", entry.path().display()), e)
            })?;
            create_symlink(&link, &target, entry.path()).map_err(|e| {
                DeployError::io(format!("create link {}", target.display()), e)
            })?;
            trace!(path = %relative.display(), link = %link.display(), "copied symlink");
        } else if file_type.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| DeployError::io(format!("create {}", target.display()), e))?;
        } else {
            // fs::copy also carries over the permission bits
            fs::copy(entry.path(), &target)
                .map_err(|e| DeployError::io(format!("copy {}", entry.path().display()), e))?;
            trace!(path = %relative.display(), "copied file");
        }

        copied += 1;
    }

    Ok(copied)
}

#[cfg(unix)]
fn create_symlink(link: &Path, target: &Path, _original: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

// Windows needs to know whether the link points at a directory
#[cfg(windows)]
fn create_symlink(link: &Path, target: &Path, original: &Path) -> io::Result<()> {
    let points_at_dir = fs::metadata(original).map(|m| m.is_dir()).unwrap_or(false);
    if points_at_dir {
        std::os::windows::fs::symlink_dir(link, target)
    } else {
        std::os::windows::fs::symlink_file(link, target)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is #[cfg(unix)] / #[cfg(windows)]?
//    - Conditional compilation: only one of the two create_symlink functions
//      exists in any given build
//    - Unix has a single symlink() call; Windows distinguishes file and
//      directory links
//
// 2. Why strip_prefix()?
//    - walkdir yields paths like docs-build/sub/b.html
//    - strip_prefix(source) turns that into sub/b.html, which we join onto dest
// -----------------------------------------------------------------------------
