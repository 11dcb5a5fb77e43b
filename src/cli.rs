// src/cli.rs
// =============================================================================
// Command-line interfaces of the two binaries, defined with clap's derive API.
//
// - deploy-html:     --source, --output
// - deploy-artifact: --owner, --repo, --output (+ API / extraction settings)
//
// Defaults live here and nowhere else; the library only ever sees the
// LocalConfig / RemoteConfig built from these structs.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::archive::ExtractPolicy;
use crate::error::DeployResult;
use crate::github::{ApiConfig, RepoRef, DEFAULT_API_URL};
use crate::local::LocalConfig;
use crate::remote::RemoteConfig;

pub const DEFAULT_SOURCE_DIR: &str = "docs-build";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_OWNER: &str = "oraNod";
pub const DEFAULT_REPO_NAME: &str = "ansible-documentation";

/// Copy a locally built documentation tree into the output directory
#[derive(Parser, Debug)]
#[command(
    name = "deploy-html",
    version,
    about = "Copy a locally built docs tree into the output directory",
    long_about = "deploy-html replaces the output directory with a full copy of the docs build. \
                  Anything previously in the output directory is deleted; symlinks are copied as links."
)]
pub struct LocalArgs {
    /// Name of the source directory
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source: PathBuf,

    /// Name of the target directory
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl LocalArgs {
    pub fn config(&self) -> LocalConfig {
        LocalConfig {
            source: self.source.clone(),
            output: self.output.clone(),
        }
    }
}

/// Download the latest docs build artifact and unpack it into the output directory
#[derive(Parser, Debug)]
#[command(
    name = "deploy-artifact",
    version,
    about = "Deploy the most recent docs build artifact from GitHub Actions",
    long_about = "deploy-artifact finds the most recent GitHub Actions artifact of a repository, \
                  downloads it, and extracts the build.tar.gz inside it into the output directory. \
                  Requires GITHUB_TOKEN."
)]
pub struct RemoteArgs {
    /// Repository owner
    #[arg(long, default_value = DEFAULT_OWNER)]
    pub owner: String,

    /// Repository name (also accepts owner/name or a github.com URL)
    #[arg(long, default_value = DEFAULT_REPO_NAME)]
    pub repo: String,

    /// Name of the target output directory
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Token sent as `Authorization: Bearer` on every API request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// API root, for GitHub Enterprise or testing
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Connect and API call timeout in seconds; archive downloads are only
    /// limited while connecting (0 waits forever)
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// How much to trust the contents of the downloaded tarball
    #[arg(long, value_enum, default_value_t = ExtractPolicy::Trusted)]
    pub extract_policy: ExtractPolicy,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl RemoteArgs {
    pub fn config(&self) -> DeployResult<RemoteConfig> {
        let timeout = (self.timeout > 0).then(|| Duration::from_secs(self.timeout));
        let api = ApiConfig::new(&self.api_url, self.token.clone())?.with_timeout(timeout);

        Ok(RemoteConfig {
            repo: RepoRef::resolve(&self.owner, &self.repo)?,
            output: self.output.clone(),
            api,
            policy: self.extract_policy,
        })
    }
}
