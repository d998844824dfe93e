mod cli;
mod config;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sigcheck_batch::{Manifest, RunReport, verify_manifest};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let report = match run(&cli).await {
        Ok(report) => report,
        Err(err) => {
            output::print_fatal(&err);
            return ExitCode::from(output::EXIT_FATAL);
        }
    };

    let status = output::conclude(&mut io::stdout().lock(), &report, cli.format, cli.verbose > 0);
    ExitCode::from(status)
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step from `warn`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

async fn run(cli: &Cli) -> Result<RunReport> {
    let settings = config::load(cli)?;

    let manifest = Manifest::open(&settings.manifest, settings.manifest_options)
        .with_context(|| format!("failed to load manifest {}", settings.manifest.display()))?;
    info!(
        manifest = %settings.manifest.display(),
        entries = manifest.len(),
        algorithm = %settings.algorithm,
        jobs = settings.batch.jobs,
        "manifest loaded"
    );

    verify_manifest(&manifest, &settings.layout, settings.algorithm, &settings.batch)
        .await
        .context("verification could not start")
}
