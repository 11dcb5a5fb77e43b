// src/github/mod.rs
// =============================================================================
// This module talks to the GitHub Actions REST API.
//
// Currently implements:
// - Building an authenticated client (bearer token + API version header)
// - Finding the most recent build artifact of a repository
// - Fetching artifact metadata and downloading its zip archive
//
// Submodules:
// - client: client construction, endpoint URLs, shared headers
// - artifacts: the three artifact endpoints and their response types
// =============================================================================

mod artifacts;
mod client;

pub use artifacts::{Artifact, ArtifactId};
pub use client::{ApiConfig, GithubClient, API_VERSION, DEFAULT_API_URL};

use std::fmt;

use crate::error::DeployError;

/// A repository on the hosting service, e.g. `ansible/ansible-documentation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    // Builds a RepoRef from an owner plus a repository argument
    //
    // The repository argument may be:
    //   - a bare name:        "ansible-documentation"  (owner taken from `owner`)
    //   - owner/name:         "ansible/ansible-documentation"
    //   - a GitHub URL:       "https://github.com/ansible/ansible-documentation.git"
    pub fn resolve(owner: &str, repo: &str) -> Result<Self, DeployError> {
        let invalid = || DeployError::InvalidRepo {
            value: repo.to_string(),
        };

        // URL prefixes are only stripped from inputs that are URLs; a bare
        // name like "www.example.org" is kept as-is
        let path = match repo
            .strip_prefix("https://")
            .or_else(|| repo.strip_prefix("http://"))
        {
            Some(rest) => {
                let rest = rest.strip_prefix("www.").unwrap_or(rest);
                // Any other host is not something we can query
                rest.strip_prefix("github.com/").ok_or_else(invalid)?
            }
            None => repo.strip_prefix("github.com/").unwrap_or(repo),
        };
        let trimmed = path.trim_end_matches('/');

        // Anything after owner/name (e.g. /tree/main) is ignored
        let (owner, name) = match trimmed.split_once('/') {
            Some((owner, rest)) => (owner, rest.split('/').next().unwrap_or_default()),
            None => (owner, trimmed),
        };

        // Only one ".git" suffix belongs to the URL
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
