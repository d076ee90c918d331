//! OTP Relay CLI
//!
//! Polls the configured OTP feeds and relays new codes to messaging channels.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use otp_relay::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::{HttpSource, MessageFormatter, Source, extractor},
    storage,
    utils::{self, http},
};

/// otp-relay - OTP feed to messaging channel relay
#[derive(Parser, Debug)]
#[command(name = "otp-relay", version, about = "OTP feed to messaging channel relay")]
struct Cli {
    /// Path to storage directory containing config.toml and the seen-set
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll all sources until interrupted
    Run,

    /// Run a single poll cycle and exit
    Once,

    /// Mark everything currently visible as seen, without sending
    Sync,

    /// Print formatted messages for one source without sending or marking
    Preview {
        /// Source position in config.toml, starting at 1
        #[arg(long, default_value_t = 1)]
        source: usize,

        /// Maximum messages to print
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },

    /// Validate configuration file
    Validate,

    /// Show configuration and seen-set info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("OTP Relay starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    match cli.command {
        Command::Run => {
            config.validate()?;
            pipeline::run_relay(&config, &cli.storage_dir, utils::shutdown_signal()).await?;
        }

        Command::Once => {
            config.validate()?;
            let stats = pipeline::run_once(&config, &cli.storage_dir).await?;
            log::info!("Cycle: {}", stats.summary());
        }

        Command::Sync => {
            config.validate()?;
            let stats = pipeline::run_sync(&config, &cli.storage_dir).await?;
            log::info!("Sync: {}", stats.summary());
        }

        Command::Preview { source, limit } => {
            let client = http::create_client(&config.poll)?;
            let sources = HttpSource::from_config(&config, &client);
            let feed = source
                .checked_sub(1)
                .and_then(|index| sources.get(index))
                .ok_or_else(|| {
                    AppError::config(format!(
                        "Source {} not found ({} configured)",
                        source,
                        sources.len()
                    ))
                })?;

            let body = feed.fetch().await?;
            let records = extractor::try_extract(feed.label(), &body)?;
            log::info!("{}: {} records", feed.label(), records.len());

            let formatter = MessageFormatter::new(&config.format, &config.bot_name);
            for record in records.iter().take(limit) {
                println!("{}\n{}", formatter.format(record, feed.label()), "─".repeat(60));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} sources, {} destinations)",
                config.sources.len(),
                config.destinations.len()
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Owner: {}", config.owner);
            for (index, source) in config.sources.iter().enumerate() {
                log::info!("Source {}: {} ({})", index + 1, config.source_label(index), source.url);
            }
            for destination in &config.destinations {
                log::info!("Destination: {}", destination);
            }

            let store = storage::open_store(&config.storage, &cli.storage_dir).await?;
            log::info!(
                "Seen-set: {} identities ({})",
                store.len().await?,
                if store.is_persistent() {
                    config.seen_store_path(&cli.storage_dir).display().to_string()
                } else {
                    "in memory".to_string()
                }
            );
        }
    }

    log::info!("Done!");

    Ok(())
}
