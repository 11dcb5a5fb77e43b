// src/github/artifacts.rs
// =============================================================================
// The three artifact endpoints the remote deployer needs:
//
// 1. GET /repos/{owner}/{repo}/actions/artifacts       -> most recent id
// 2. GET /repos/{owner}/{repo}/actions/artifacts/{id}  -> archive_download_url
// 3. GET {archive_download_url}                        -> zip bytes
//
// A non-success status on any of them becomes its own DeployError variant, so
// the caller stops right there instead of carrying on with missing data.
// =============================================================================

use std::fmt;
use std::path::Path;

use futures::StreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::client::GithubClient;
use super::RepoRef;
use crate::error::{DeployError, DeployResult};

/// Numeric artifact identifier assigned by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The part of an artifact object we use
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size_in_bytes: u64,
    pub archive_download_url: String,
    #[serde(default)]
    pub expired: bool,
}

// Response body of the listing endpoint
#[derive(Debug, Deserialize)]
struct ArtifactList {
    #[serde(default)]
    total_count: u64,
    artifacts: Vec<Artifact>,
}

impl GithubClient {
    // Returns the id of the most recent artifact, or None if there are none
    //
    // The API lists artifacts newest first, so this is simply element 0; the
    // list is not sorted here.
    pub async fn latest_artifact(&self, repo: &RepoRef) -> DeployResult<Option<ArtifactId>> {
        let url = self.endpoint(&["repos", &repo.owner, &repo.name, "actions", "artifacts"])?;
        debug!(%url, "listing artifacts");

        let response = self.api_get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DeployError::ArtifactsUnavailable { status });
        }

        let list: ArtifactList = response.json().await?;
        debug!(total = list.total_count, "artifact listing received");

        Ok(list.artifacts.first().map(|artifact| artifact.id))
    }

    // Fetches the metadata of one artifact
    pub async fn artifact(&self, repo: &RepoRef, id: ArtifactId) -> DeployResult<Artifact> {
        let id_segment = id.to_string();
        let url = self.endpoint(&[
            "repos",
            &repo.owner,
            &repo.name,
            "actions",
            "artifacts",
            &id_segment,
        ])?;
        debug!(%url, "fetching artifact metadata");

        let response = self.api_get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DeployError::ArchiveMissing { id, status });
        }

        let artifact: Artifact = response.json().await?;
        info!(
            id = %artifact.id,
            name = %artifact.name,
            size = artifact.size_in_bytes,
            expired = artifact.expired,
            "found artifact"
        );

        Ok(artifact)
    }

    // Streams the artifact's zip archive into `dest`
    //
    // Nothing is written when the status is not a success. Returns the number
    // of bytes written. Only connecting is time-limited here; the body may take
    // as long as it needs.
    pub async fn download(&self, artifact: &Artifact, dest: &Path) -> DeployResult<u64> {
        debug!(url = %artifact.archive_download_url, "downloading archive");

        // Default headers, bearer included, are sent to the signed URL too
        let response = self.http.get(&artifact.archive_download_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DeployError::DownloadFailed { status });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DeployError::io(format!("create {}", dest.display()), e))?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        // Chunks go straight to disk so the archive is never held in memory
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DeployError::io(format!("write {}", dest.display()), e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| DeployError::io(format!("write {}", dest.display()), e))?;

        debug!(bytes = written, path = %dest.display(), "archive saved");
        Ok(written)
    }
}
