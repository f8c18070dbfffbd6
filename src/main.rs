use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tokio::runtime::Builder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mdi_check::cli::Cli;
use mdi_check::core::MdiChecker;
use mdi_check::output::render_outcome;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // One request and one lookup, awaited in sequence on a single thread
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<ExitCode> {
    let mode = cli.output_mode();
    let cloud = cli.cloud();
    let checker = MdiChecker::new(cloud)?;

    info!("Checking domain {} against {}", cli.domain, cloud.autodiscover_url());

    let outcome = checker.check_domain(&cli.domain).await;
    if let Err(e) = &outcome {
        error!("Check aborted for {}: {}", cli.domain, e);
    }

    let (output, status) = render_outcome(&outcome, mode)?;
    println!("{}", output);
    Ok(status.into())
}
