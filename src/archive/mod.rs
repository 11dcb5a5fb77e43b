// src/archive/mod.rs
// =============================================================================
// Unpacking of a downloaded docs build artifact.
//
// GitHub wraps every artifact in a zip. The docs workflow uploads a single
// build.tar.gz, so the layout we expect is:
//
//   build.zip
//   └── build.tar.gz
//       └── index.html, _static/, ...
//
// unpack_artifact() extracts the zip into a scratch directory, then replaces
// the output directory with the contents of the tarball.
// =============================================================================

mod untar;
mod unzip;

pub use untar::extract_tarball;
pub use unzip::extract_zip;

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::error::{DeployError, DeployResult};
use crate::output;

/// Name of the tarball the docs workflow puts inside the artifact zip
pub const TARBALL_NAME: &str = "build.tar.gz";

/// How much the tarball contents are trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExtractPolicy {
    /// The artifact comes from our own CI: keep permissions and mtimes
    #[default]
    Trusted,
    /// Validate every entry and refuse anything that could escape the output
    Strict,
}

// Looks for the inner tarball at the top of the extracted zip
pub fn find_tarball(dir: &Path) -> DeployResult<PathBuf> {
    let tarball = dir.join(TARBALL_NAME);
    if tarball.is_file() {
        Ok(tarball)
    } else {
        Err(DeployError::MissingTarball {
            name: TARBALL_NAME.to_string(),
        })
    }
}

// Unpacks `zip_path` into `output`, using `scratch` for the intermediate files
//
// The output directory is only touched once the tarball has been found, so a
// malformed artifact leaves the previous deployment in place.
// Returns the number of entries extracted into `output`.
pub fn unpack_artifact(
    zip_path: &Path,
    scratch: &Path,
    output: &Path,
    policy: ExtractPolicy,
) -> DeployResult<usize> {
    extract_zip(zip_path, scratch)?;
    let tarball = find_tarball(scratch)?;

    output::reset_dir(output)?;
    extract_tarball(&tarball, output, policy)
}
