//! android-sdk-client entry point
//!
//! Parses the command line, sets up logging and runs one listing.

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use android_sdk_client::cli::Cli;
use android_sdk_client::repository::{HttpFetcher, RepositoryOrchestrator, DONE_MESSAGE};
use android_sdk_client::VERSION;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.help {
        println!("{}", Cli::usage());
        std::process::exit(1);
    }

    if cli.version {
        println!("{}", VERSION);
        return Ok(());
    }

    // Listing goes to stdout; diagnostics go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = cli.config();
    config.validate()?;

    match HttpFetcher::new() {
        Ok(fetcher) => {
            let orchestrator = RepositoryOrchestrator::new(fetcher, config);
            orchestrator.run().await;
            orchestrator.finish_exports().await;
        }
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            println!("{}", DONE_MESSAGE);
        }
    }

    Ok(())
}
