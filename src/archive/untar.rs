// src/archive/untar.rs
// =============================================================================
// Extraction of the inner build.tar.gz into the output directory.
//
// The tar crate's unpack_in() never writes outside the destination, whatever
// the policy. On top of that:
// - Trusted: permissions and mtimes from the archive are kept as-is
// - Strict: entries with absolute or `..` paths, links pointing outside the
//   output, paths that go through a link extracted earlier, and device/fifo
//   entries abort the extraction
// =============================================================================

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, Entry};
use tracing::{debug, trace};

use super::ExtractPolicy;
use crate::error::{DeployError, DeployResult};

// Extracts the gzip-compressed tarball at `tarball` into `dest`
//
// Returns the number of entries written.
pub fn extract_tarball(tarball: &Path, dest: &Path, policy: ExtractPolicy) -> DeployResult<usize> {
    let file = File::open(tarball)
        .map_err(|e| DeployError::io(format!("open {}", tarball.display()), e))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    // Only a trusted archive gets to choose modes and timestamps
    let trusted = policy == ExtractPolicy::Trusted;
    archive.set_preserve_permissions(trusted);
    archive.set_preserve_mtime(trusted);
    archive.set_overwrite(true);

    let read_error = |e: std::io::Error| DeployError::io(format!("read {}", tarball.display()), e);

    let mut extracted = 0;
    // Symlinks written so far in strict mode, as paths relative to `dest`
    let mut symlinks: HashSet<PathBuf> = HashSet::new();

    for entry in archive.entries().map_err(read_error)? {
        let mut entry = entry.map_err(read_error)?;

        let checked = match policy {
            ExtractPolicy::Strict => Some(check_entry(&entry, &symlinks)?),
            ExtractPolicy::Trusted => None,
        };

        let path = entry.path().map_err(read_error)?.into_owned();
        // false means tar skipped an entry that would land outside `dest`
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| DeployError::io(format!("extract {}", path.display()), e))?;

        if unpacked {
            trace!(path = %path.display(), "extracted");
            extracted += 1;

            // Later entries must not walk through this link
            if let Some(resolved) = checked {
                if entry.header().entry_type().is_symlink() {
                    symlinks.insert(resolved);
                }
            }
        }
    }

    debug!(entries = extracted, dest = %dest.display(), ?policy, "tarball extracted");
    Ok(extracted)
}

// Rejects entries a non-trusted archive should not be allowed to create
//
// `symlinks` holds the links already extracted. On success returns the entry
// path with `.` components removed.
fn check_entry<R: Read>(
    entry: &Entry<'_, R>,
    symlinks: &HashSet<PathBuf>,
) -> DeployResult<PathBuf> {
    let path = entry
        .path()
        .map_err(|e| DeployError::io("read tar entry path", e))?
        .into_owned();

    let unsafe_entry = || DeployError::UnsafeEntry { path: path.clone() };

    let plain_components = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !plain_components {
        return Err(unsafe_entry());
    }

    // The entry may not sit below an earlier link, nor replace one
    let resolved = resolve_inside(&path, symlinks).ok_or_else(unsafe_entry)?;
    if resolved.as_os_str().is_empty() || symlinks.contains(&resolved) {
        return Err(unsafe_entry());
    }

    let kind = entry.header().entry_type();

    if kind.is_character_special() || kind.is_block_special() || kind.is_fifo() {
        return Err(unsafe_entry());
    }

    if kind.is_symlink() || kind.is_hard_link() {
        let link = entry
            .link_name()
            .map_err(|e| DeployError::io("read tar link name", e))?;

        if let Some(link) = link {
            // Symlink targets are relative to the link's directory, hard link
            // targets to the archive root
            let base = if kind.is_symlink() {
                resolved.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                PathBuf::new()
            };

            if link.is_absolute() || resolve_inside(&base.join(&link), symlinks).is_none() {
                return Err(unsafe_entry());
            }
        }
    }

    Ok(resolved)
}

// Lexically resolves `.` and `..` in a relative path
//
// Returns None when the path climbs above its root, is absolute, or keeps
// going after reaching one of `symlinks` (the link could point anywhere
// inside the tree, so `..` or a child name after it can't be resolved).
fn resolve_inside(path: &Path, symlinks: &HashSet<PathBuf>) -> Option<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        if !resolved.as_os_str().is_empty() && symlinks.contains(&resolved) {
            return None;
        }

        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use tar::{Builder, EntryType, Header};
    use tempfile::TempDir;

    // Builds a tar.gz where each entry is (path, kind, data-or-link-target).
    // Paths are written straight into the header so tests can produce entries
    // the tar Builder API would refuse.
    fn write_tarball(path: &Path, entries: &[(&str, EntryType, &str)]) {
        let file = File::create(path).unwrap();
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

        for (name, kind, data) in entries {
            let mut header = Header::new_gnu();
            {
                let raw = header.as_old_mut();
                raw.name[..name.len()].copy_from_slice(name.as_bytes());
            }
            header.set_entry_type(*kind);
            header.set_mode(if kind.is_dir() { 0o755 } else { 0o644 });

            if kind.is_symlink() || kind.is_hard_link() {
                header.set_size(0);
                {
                    let raw = header.as_old_mut();
                    raw.linkname[..data.len()].copy_from_slice(data.as_bytes());
                }
                header.set_cksum();
                builder.append(&header, std::io::empty()).unwrap();
            } else {
                header.set_size(data.len() as u64);
                header.set_cksum();
                builder.append(&header, data.as_bytes()).unwrap();
            }
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_trusted_extracts_files_and_links() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("build.tar.gz");
        write_tarball(
            &tarball,
            &[
                ("index.html", EntryType::Regular, "<h1>docs</h1>"),
                ("sub/", EntryType::Directory, ""),
                ("sub/page.html", EntryType::Regular, "page"),
            ],
        );

        let dest = temp.path().join("output");
        fs::create_dir_all(&dest).unwrap();
        let count = extract_tarball(&tarball, &dest, ExtractPolicy::Trusted).unwrap();

        assert_eq!(count, 3);
        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "<h1>docs</h1>");
        assert_eq!(fs::read_to_string(dest.join("sub/page.html")).unwrap(), "page");
    }

    #[test]
    fn test_strict_rejects_parent_dir_entry() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("build.tar.gz");
        write_tarball(&tarball, &[("../evil.html", EntryType::Regular, "x")]);

        let dest = temp.path().join("output");
        fs::create_dir_all(&dest).unwrap();
        let result = extract_tarball(&tarball, &dest, ExtractPolicy::Strict);

        assert!(matches!(result, Err(DeployError::UnsafeEntry { .. })));
        assert!(!temp.path().join("evil.html").exists());
    }

    #[test]
    fn test_trusted_still_never_escapes_dest() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("build.tar.gz");
        write_tarball(
            &tarball,
            &[
                ("../evil.html", EntryType::Regular, "x"),
                ("ok.html", EntryType::Regular, "ok"),
            ],
        );

        let dest = temp.path().join("output");
        fs::create_dir_all(&dest).unwrap();
        let count = extract_tarball(&tarball, &dest, ExtractPolicy::Trusted).unwrap();

        assert_eq!(count, 1);
        assert!(!temp.path().join("evil.html").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_strict_link_checks() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("output");
        fs::create_dir_all(&dest).unwrap();

        let inside = temp.path().join("inside.tar.gz");
        write_tarball(
            &inside,
            &[
                ("sub/", EntryType::Directory, ""),
                ("sub/b.html", EntryType::Regular, "b"),
                ("sub/up", EntryType::Symlink, "../sub/b.html"),
            ],
        );
        assert_eq!(extract_tarball(&inside, &dest, ExtractPolicy::Strict).unwrap(), 3);
        assert_eq!(fs::read_link(dest.join("sub/up")).unwrap(), Path::new("../sub/b.html"));

        let escaping = temp.path().join("escaping.tar.gz");
        write_tarball(&escaping, &[("etc", EntryType::Symlink, "/etc")]);
        assert!(matches!(
            extract_tarball(&escaping, &dest, ExtractPolicy::Strict),
            Err(DeployError::UnsafeEntry { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_strict_rejects_paths_through_earlier_links() {
        let temp = TempDir::new().unwrap();

        // l1 -> . makes l1/l2 -> .. resolve to the output's parent
        let chained = temp.path().join("chained.tar.gz");
        write_tarball(
            &chained,
            &[
                ("l1", EntryType::Symlink, "."),
                ("l1/l2", EntryType::Symlink, ".."),
            ],
        );
        let dest = temp.path().join("output");
        fs::create_dir_all(&dest).unwrap();
        assert!(matches!(
            extract_tarball(&chained, &dest, ExtractPolicy::Strict),
            Err(DeployError::UnsafeEntry { .. })
        ));
        assert!(fs::symlink_metadata(dest.join("l2")).is_err());

        // Same trick inside a link target
        let through_target = temp.path().join("target.tar.gz");
        write_tarball(
            &through_target,
            &[
                ("l1", EntryType::Symlink, "."),
                ("a", EntryType::Symlink, "l1/.."),
            ],
        );
        let dest = temp.path().join("output2");
        fs::create_dir_all(&dest).unwrap();
        assert!(matches!(
            extract_tarball(&through_target, &dest, ExtractPolicy::Strict),
            Err(DeployError::UnsafeEntry { .. })
        ));
        assert!(fs::symlink_metadata(dest.join("a")).is_err());

        // Files below a link are refused as well
        let below_link = temp.path().join("below.tar.gz");
        write_tarball(
            &below_link,
            &[
                ("latest", EntryType::Symlink, "sub"),
                ("latest/page.html", EntryType::Regular, "x"),
            ],
        );
        let dest = temp.path().join("output3");
        fs::create_dir_all(&dest).unwrap();
        assert!(matches!(
            extract_tarball(&below_link, &dest, ExtractPolicy::Strict),
            Err(DeployError::UnsafeEntry { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_strict_allows_link_to_link() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("build.tar.gz");
        write_tarball(
            &tarball,
            &[
                ("sub/", EntryType::Directory, ""),
                ("sub/page.html", EntryType::Regular, "page"),
                ("latest", EntryType::Symlink, "sub"),
                ("current", EntryType::Symlink, "latest"),
            ],
        );

        let dest = temp.path().join("output");
        fs::create_dir_all(&dest).unwrap();
        assert_eq!(extract_tarball(&tarball, &dest, ExtractPolicy::Strict).unwrap(), 4);
        assert_eq!(fs::read_link(dest.join("current")).unwrap(), Path::new("latest"));
    }

    #[test]
    fn test_resolve_inside() {
        let none = HashSet::new();
        assert_eq!(resolve_inside(Path::new("a/b/../c"), &none), Some(PathBuf::from("a/c")));
        assert_eq!(resolve_inside(Path::new("./a"), &none), Some(PathBuf::from("a")));
        assert_eq!(resolve_inside(Path::new("a/../../b"), &none), None);
        assert_eq!(resolve_inside(Path::new("/abs"), &none), None);

        let links: HashSet<PathBuf> = [PathBuf::from("l1")].into_iter().collect();
        assert_eq!(resolve_inside(Path::new("l1"), &links), Some(PathBuf::from("l1")));
        assert_eq!(resolve_inside(Path::new("l1/.."), &links), None);
        assert_eq!(resolve_inside(Path::new("l1/x"), &links), None);
    }

    #[test]
    fn test_not_gzip_is_an_error() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("build.tar.gz");
        fs::write(&tarball, "plain text").unwrap();

        let result = extract_tarball(&tarball, temp.path(), ExtractPolicy::Trusted);
        assert!(matches!(result, Err(DeployError::Io { .. })));
    }
}
