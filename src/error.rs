// src/error.rs
// =============================================================================
// Error type shared by the local and remote deployers.
//
// Every failure the library can hit is one variant of DeployError, so the
// binaries can decide how to report it (diagnostic + exit code) with a single
// match instead of inspecting strings.
// =============================================================================

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::github::ArtifactId;

/// Result alias used throughout the library
pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, Error)]
pub enum DeployError {
    /// The local build directory does not exist (or is not a directory)
    #[error("source directory {path} does not exist")]
    SourceMissing { path: PathBuf },

    /// Filesystem error, with a short description of what we were doing
    #[error("failed to {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Error while walking the source tree
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// The --repo argument could not be turned into owner/name
    #[error("invalid repository: {value:?}")]
    InvalidRepo { value: String },

    /// The token contains characters that cannot go into an HTTP header
    #[error("GITHUB_TOKEN is not a valid header value")]
    InvalidToken,

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// Transport-level failure (connection refused, timeout, bad JSON, ...)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The artifact listing endpoint answered with a non-success status
    #[error("Docs build artifacts not available (HTTP {status})")]
    ArtifactsUnavailable { status: StatusCode },

    /// The artifact listing was empty
    #[error("Could not get the most recent artifact.")]
    NoArtifact,

    /// The metadata endpoint for a known id answered with a non-success status
    #[error("Docs build archive does not exist (artifact {id}, HTTP {status})")]
    ArchiveMissing { id: ArtifactId, status: StatusCode },

    /// The signed archive URL answered with a non-success status
    #[error("Failed to download docs build archive (HTTP {status})")]
    DownloadFailed { status: StatusCode },

    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The downloaded zip did not contain the expected inner tarball
    #[error("{name} not found in the downloaded artifact")]
    MissingTarball { name: String },

    /// Strict extraction refused an entry that would land outside the output
    #[error("refusing to extract unsafe archive entry {path}")]
    UnsafeEntry { path: PathBuf },
}

impl DeployError {
    /// Wraps an io::Error with a description of the failed operation
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DeployError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for failures that mean "nothing to deploy" rather than a broken tool.
    ///
    /// The binaries print these as a plain diagnostic and exit with code 1;
    /// anything else is reported as an unexpected error.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DeployError::ArtifactsUnavailable { .. }
                | DeployError::NoArtifact
                | DeployError::ArchiveMissing { .. }
                | DeployError::DownloadFailed { .. }
                | DeployError::MissingTarball { .. }
        )
    }
}
