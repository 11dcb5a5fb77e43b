// src/archive/unzip.rs
// =============================================================================
// Extraction of the outer zip archive that GitHub serves for an artifact.
// =============================================================================

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{DeployError, DeployResult};

// Extracts every entry of the zip at `zip_path` into `dest`
//
// Entries whose names would resolve outside `dest` (absolute paths, `..`)
// are skipped with a warning. Returns the number of entries written.
pub fn extract_zip(zip_path: &Path, dest: &Path) -> DeployResult<usize> {
    let file = File::open(zip_path)
        .map_err(|e| DeployError::io(format!("open {}", zip_path.display()), e))?;
    let mut archive = ZipArchive::new(file)?;

    let mut extracted = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        // None for absolute names and names with `..` that climb out
        let Some(relative) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping zip entry outside the extraction directory");
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .map_err(|e| DeployError::io(format!("create {}", outpath.display()), e))?;
        } else {
            // Zips don't always list parent directories before their files
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| DeployError::io(format!("create {}", parent.display()), e))?;
            }

            let mut outfile = File::create(&outpath)
                .map_err(|e| DeployError::io(format!("create {}", outpath.display()), e))?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|e| DeployError::io(format!("extract {}", outpath.display()), e))?;
        }

        extracted += 1;
    }

    debug!(entries = extracted, dest = %dest.display(), "zip extracted");
    Ok(extracted)
}
