//! Talent-Harvest main entry point
//!
//! This is the command-line interface for the Talent-Harvest data mirror.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use talent_harvest::config::{load_config_with_hash, Config};
use talent_harvest::crawler::{harvest, Endpoints};
use talent_harvest::output::{print_summary, StatsCollector};
use talent_harvest::HarvestError;
use tracing_subscriber::EnvFilter;

/// Talent-Harvest: mirror an applicant-tracking tenant to disk
///
/// Signs in with client credentials, walks every application and everything
/// linked from it, and writes JSON snapshots and attachments under the
/// configured apps_dir.
#[derive(Parser, Debug)]
#[command(name = "talent-harvest")]
#[command(version)]
#[command(about = "Mirror an applicant-tracking tenant to disk", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the log to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Validate config and show what would be harvested without contacting the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let endpoints = Endpoints::from_config(&config);

    if cli.dry_run {
        handle_dry_run(&config, &endpoints);
        return Ok(ExitCode::SUCCESS);
    }

    Ok(handle_harvest(&config, &endpoints).await)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("talent_harvest=info,warn"),
            1 => EnvFilter::new("talent_harvest=debug,info"),
            2 => EnvFilter::new("talent_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config, endpoints: &Endpoints) {
    let tenant = &config.migrate.tenant;

    println!("=== Talent-Harvest Dry Run ===\n");

    println!("Endpoints:");
    println!("  Sign-in: {}", endpoints.token_url(tenant));
    println!("  Applications: {}", endpoints.applications_url(tenant));
    println!("  Client id: {}", config.migrate.client_id);

    println!("\nCrawler Configuration:");
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!("  Branch budget: {}s", config.crawler.branch_timeout_secs);
    println!(
        "  Concurrent applications: {}",
        config.crawler.max_concurrent_applications
    );
    println!("  Max depth: {}", config.crawler.max_depth);

    println!("\nOutput:");
    println!("  Apps dir: {}", config.apps_dir().display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, endpoints: &Endpoints) -> ExitCode {
    let stats = StatsCollector::new();
    let result = harvest(config, endpoints, &stats).await;
    let summary = stats.finish();

    match result {
        Ok(applications) => {
            tracing::info!(
                applications,
                gaps = summary.total_gaps(),
                "Harvest completed"
            );
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_fatal(error: &HarvestError) {
    tracing::error!(kind = error.kind(), "Harvest aborted: {}", error);
    eprintln!("{}: {}", error.kind(), error);
}
