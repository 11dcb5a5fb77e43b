// src/logging.rs
// =============================================================================
// tracing subscriber setup shared by both binaries.
//
// User-facing messages are plain println!/eprintln! in the binaries; this only
// controls the diagnostic log, which always goes to stderr so it never mixes
// with normal output.
// =============================================================================

use tracing_subscriber::EnvFilter;

// Installs the global subscriber
//
// RUST_LOG wins when set. Otherwise only warnings are shown, or everything
// down to debug for this crate with --verbose.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "warn,docs_deploy=debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init: a second call (e.g. from tests) is not an error worth crashing on
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
