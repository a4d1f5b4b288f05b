use anyhow::Result;
use clap::{Parser, Subcommand};
use showlists::fetch::HttpFetcher;
use showlists::inspect::{InspectOptions, inspect_source};
use showlists::pipeline::{
    DEFAULT_DELAY_MS, DEFAULT_UPCOMING_DAYS, ImportOptions, ListOptions, ScrapeOptions,
    ValidateOptions, import_events, list_upcoming, scrape_sources, validate_configs,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "showlists", about = "Config-driven live music listings aggregator")]
struct Cli {
    #[arg(long, default_value = "configs/sources")]
    config_dir: PathBuf,

    #[arg(long, default_value = "data/concerts.json")]
    store_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Scrape {
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        delay_ms: u64,
    },
    List {
        #[arg(long, default_value_t = DEFAULT_UPCOMING_DAYS)]
        days: i64,
        #[arg(long, default_value_t = false)]
        favorites: bool,
    },
    Import {
        #[arg(long)]
        file: PathBuf,
    },
    Validate {
        #[arg(long)]
        source_file: Option<PathBuf>,
    },
    Inspect {
        #[arg(long)]
        source: Option<String>,
        #[arg(long, conflicts_with = "source")]
        url: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            source,
            dry_run,
            delay_ms,
        } => {
            let output = scrape_sources(&ScrapeOptions {
                config_dir: cli.config_dir,
                store_path: cli.store_path,
                source,
                dry_run,
                delay_ms,
            })?;

            for success in &output.report.successful {
                info!(source = %success.source, events = success.count, "source summary");
            }
            for failure in &output.report.failed {
                info!(source = %failure.source, error = %failure.error, "source failed");
            }
            println!("{}", serde_json::to_string_pretty(&output.report)?);
        }
        Commands::List { days, favorites } => {
            let events = list_upcoming(&ListOptions {
                store_path: cli.store_path,
                days,
                favorites_only: favorites,
                today: None,
            })?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Commands::Import { file } => {
            let added = import_events(&ImportOptions {
                store_path: cli.store_path,
                input: file,
            })?;
            println!("added {added} events");
        }
        Commands::Validate { source_file } => {
            let messages = validate_configs(&ValidateOptions {
                config_dir: Some(cli.config_dir),
                source_file,
            })?;
            for line in messages {
                println!("{line}");
            }
        }
        Commands::Inspect { source, url } => {
            let report = inspect_source(
                &InspectOptions {
                    config_dir: cli.config_dir,
                    source,
                    url,
                },
                &HttpFetcher,
            )?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
