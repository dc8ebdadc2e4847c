//! Stock Monitor CLI
//!
//! Local execution entry point, meant to be run from cron. For AWS Lambda,
//! use `stock-monitor-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stock_monitor::{
    config,
    error::Result,
    models::{Config, RunConfig},
    pipeline,
    services::{ConsoleNotifier, TelegramNotifier},
    storage::{ReadOnlyStore, SnapshotStore},
};

/// Stock Monitor - IDC stock watcher with Telegram reports
#[derive(Parser, Debug)]
#[command(
    name = "stock-monitor",
    version,
    about = "Polls product pages for stock counts and reports changes"
)]
struct Cli {
    /// Path to the TOML config file (defaults are used when missing)
    #[arg(short, long, default_value = "monitor.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one monitoring cycle
    Run {
        /// Print the message instead of sending it, and keep the state file
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the config file and environment
    Validate,

    /// Show the recorded snapshot
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { dry_run } => {
            let (config, run) = config::load_all(&cli.config)?;
            log::debug!("Run settings: {:?}", run);

            let store = config::local_store(&config, Some(&run));
            let outcome = if dry_run {
                log::info!("Dry run: messages go to stdout, state is not written");
                let store = ReadOnlyStore::new(store);
                pipeline::run_monitor(&config, &run, &store, &ConsoleNotifier).await?
            } else {
                let notifier = TelegramNotifier::from_config(&config.notifier, &run)?;
                pipeline::run_monitor(&config, &run, &store, &notifier).await?
            };

            log::info!(
                "Done: {} ({} items, {} changes)",
                outcome.label(),
                outcome.item_count(),
                outcome.change_count()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config::load_all(&cli.config) {
                log::error!("Validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({})", cli.config.display());
            log::info!("✓ Environment OK");

            log::info!("All validations passed!");
        }

        Command::Info => {
            let config = Config::load_or_default(&cli.config);
            let run = RunConfig::from_env().ok();
            let store = config::local_store(&config, run.as_ref());

            log::info!("State file: {}", store.location());
            match store.load().await {
                Some(snapshot) => {
                    log::info!(
                        "Recorded snapshot: {} items, {} in stock",
                        snapshot.len(),
                        snapshot.available_count()
                    );
                    for (name, count) in snapshot.iter() {
                        log::info!("  {}: {}", name, count);
                    }
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
