// src/bin/deploy_html.rs
// =============================================================================
// Entry point of the local deployer.
//
// What happens here:
// 1. Parse --source / --output
// 2. Replace the output directory with a copy of the source build
// 3. Print the result of the post-copy check
// 4. Exit with proper code (0 = done, 2 = error)
//
// The existence check only prints a message; it does not change the exit code.
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;

use docs_deploy::cli::LocalArgs;
use docs_deploy::{local, logging};

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run() -> Result<i32> {
    let args = LocalArgs::parse();
    logging::init(args.verbose);

    let config = args.config();

    println!(
        "📦 Copying {} to {}",
        config.source.display(),
        config.output.display()
    );

    let report = local::deploy_local(&config)
        .with_context(|| format!("could not deploy {}", config.source.display()))?;

    println!("{}", report.message());
    Ok(0)
}
