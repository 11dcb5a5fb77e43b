// src/remote.rs
// =============================================================================
// Remote deployer: replaces the output directory with the contents of the
// most recent docs build artifact.
//
// Steps (each one only runs if the previous one succeeded):
// 1. Discover the most recent artifact id
// 2. Fetch its metadata to get the signed archive URL
// 3. Download the zip into a temporary directory
// 4. Extract the zip, then the inner build.tar.gz into the output directory
//
// The temporary directory is a tempfile::TempDir, so it is removed when the
// deployment returns, successfully or not.
// =============================================================================

use std::path::PathBuf;

use tracing::info;

use crate::archive::{self, ExtractPolicy};
use crate::error::{DeployError, DeployResult};
use crate::github::{ApiConfig, ArtifactId, GithubClient, RepoRef};

/// Everything a remote deployment needs; nothing is read from globals
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub repo: RepoRef,
    pub output: PathBuf,
    pub api: ApiConfig,
    pub policy: ExtractPolicy,
}

/// Progress notifications, in the order they happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// The listing returned an artifact
    Discovered(ArtifactId),
    /// The archive was saved to the scratch directory
    Downloaded { bytes: u64 },
    /// The tarball was extracted into the output directory
    Extracted { entries: usize },
}

/// What a successful remote deployment did
#[derive(Debug, Clone)]
pub struct RemoteReport {
    pub artifact: ArtifactId,
    pub archive_bytes: u64,
    pub entries: usize,
}

// Runs a full remote deployment without progress reporting
pub async fn deploy_remote(config: &RemoteConfig) -> DeployResult<RemoteReport> {
    deploy_remote_with(config, |_| {}).await
}

// Runs a full remote deployment, calling `on_event` after each completed step
//
// Discovery runs exactly once here; an empty listing ends the deployment with
// DeployError::NoArtifact before any other request is made.
pub async fn deploy_remote_with<F>(
    config: &RemoteConfig,
    mut on_event: F,
) -> DeployResult<RemoteReport>
where
    F: FnMut(&RemoteEvent),
{
    let client = GithubClient::new(&config.api)?;

    // An empty listing is a handled failure, not a crash
    let id = client
        .latest_artifact(&config.repo)
        .await?
        .ok_or(DeployError::NoArtifact)?;
    on_event(&RemoteEvent::Discovered(id));

    fetch_and_unpack(&client, config, id, on_event).await
}

// Steps 2-4 for an already discovered artifact
pub async fn fetch_and_unpack<F>(
    client: &GithubClient,
    config: &RemoteConfig,
    id: ArtifactId,
    mut on_event: F,
) -> DeployResult<RemoteReport>
where
    F: FnMut(&RemoteEvent),
{
    // The listing has no download URL; the metadata call provides it
    let artifact = client.artifact(&config.repo, id).await?;

    // Removed on drop, whichever step below fails
    let scratch = tempfile::Builder::new()
        .prefix("docs-deploy-")
        .tempdir()
        .map_err(|e| DeployError::io("create temporary directory", e))?;

    let zip_path = scratch.path().join("build.zip");
    let archive_bytes = client.download(&artifact, &zip_path).await?;
    on_event(&RemoteEvent::Downloaded {
        bytes: archive_bytes,
    });

    // The zip is unpacked next to itself; only the inner tarball reaches
    // the output directory
    let unpacked = scratch.path().join("unpacked");
    std::fs::create_dir_all(&unpacked)
        .map_err(|e| DeployError::io(format!("create {}", unpacked.display()), e))?;

    let entries = archive::unpack_artifact(&zip_path, &unpacked, &config.output, config.policy)?;
    on_event(&RemoteEvent::Extracted { entries });

    info!(
        repo = %config.repo,
        artifact = %id,
        output = %config.output.display(),
        entries,
        "deployed docs artifact"
    );

    Ok(RemoteReport {
        artifact: id,
        archive_bytes,
        entries,
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a generic F: FnMut(&RemoteEvent) instead of println! here?
//    - The library never prints; the binary decides what the user sees
//    - FnMut lets the caller's closure mutate captured state (tests collect
//      the events into a Vec)
//
// 2. What does .ok_or(DeployError::NoArtifact)? do?
//    - Turns Option<ArtifactId> into Result<ArtifactId, DeployError>
//    - None becomes Err(NoArtifact), which ? returns to the caller
//
// 3. When is the temporary directory deleted?
//    - `scratch` is a TempDir; its Drop impl removes the directory
//    - Every return path (including early returns through ?) drops it
// -----------------------------------------------------------------------------
