// src/local/mod.rs
// =============================================================================
// Local deployer: replaces the output directory with a copy of a locally
// generated documentation build.
//
// Steps:
// 1. Make sure the source build exists
// 2. Remove the previous output (full replacement, never a merge)
// 3. Copy the source tree, keeping symlinks as links
// 4. Check that the output directory is there
// =============================================================================

mod copy;

pub use copy::copy_tree;

use std::path::PathBuf;

use tracing::info;

use crate::error::{DeployError, DeployResult};
use crate::output;

/// Where to copy from and to
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Directory holding the generated docs (e.g. `docs-build`)
    pub source: PathBuf,
    /// Directory to replace with the copy
    pub output: PathBuf,
}

/// What a local deployment did
#[derive(Debug, Clone)]
pub struct LocalReport {
    /// Number of files, directories and links written below the output
    pub entries: usize,
    /// Whether the output directory existed once the copy finished
    pub output_exists: bool,
}

impl LocalReport {
    /// Human-readable result of the post-copy existence check
    pub fn message(&self) -> &'static str {
        if self.output_exists {
            "Build files copied successfully."
        } else {
            "Failed to copy build files."
        }
    }
}

// Runs a local deployment
//
// The source is checked before anything is deleted, so a wrong --source
// leaves the previous output in place.
pub fn deploy_local(config: &LocalConfig) -> DeployResult<LocalReport> {
    // Check the source first so a typo never wipes the current output
    if !config.source.is_dir() {
        return Err(DeployError::SourceMissing {
            path: config.source.clone(),
        });
    }

    // Full replacement: nothing from the previous deploy survives
    output::remove_existing(&config.output)?;

    let entries = copy_tree(&config.source, &config.output)?;

    // Reported as found on disk after the copy
    let output_exists = config.output.is_dir();

    info!(
        source = %config.source.display(),
        output = %config.output.display(),
        entries,
        "copied docs build"
    );

    Ok(LocalReport {
        entries,
        output_exists,
    })
}
