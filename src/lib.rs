// src/lib.rs
// =============================================================================
// Library half of docs-deploy, shared by the two binaries:
//
// - deploy-html      (src/bin/deploy_html.rs):     local::deploy_local
// - deploy-artifact  (src/bin/deploy_artifact.rs): remote::deploy_remote_with
//
// Module map:
// - cli:     clap argument structs and their defaults
// - local:   recursive copy of a local docs build
// - github:  GitHub Actions artifact API client
// - archive: zip + tar.gz extraction
// - remote:  discovery -> download -> unpack pipeline
// - output:  full-replacement helpers for the target directory
// - error:   DeployError, the single library error type
// - logging: tracing subscriber setup
// =============================================================================

pub mod archive;
pub mod cli;
pub mod error;
pub mod github;
pub mod local;
pub mod logging;
pub mod output;
pub mod remote;

pub use error::{DeployError, DeployResult};
