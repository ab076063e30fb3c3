//! sdp - PDR parsing, discovery, and validation tool

use anyhow::{bail, Context, Result};
use clap::Parser;
use sdp_common::logging::{init_logging, LogConfig, LogLevel};
use sdp_ingest::{config, discover_pdrs, validate_granules, ProviderConfig};
use sdp_parser::{parse_pdr_with_registry, CollectionRegistry, GranuleIdExtractor};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sdp")]
#[command(author, version, about = "Satellite data PDR tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Parse a local PDR file and print the granules as JSON
    Parse {
        /// Path to the PDR file
        input: PathBuf,

        /// Granule id extraction regex applied to every FILE_GROUP
        #[arg(short, long)]
        granule_regex: Option<String>,

        /// JSON file of per-collection extraction settings
        #[arg(short, long)]
        collections: Option<PathBuf>,
    },

    /// List the PDRs available on the configured provider
    Discover {
        /// Provider directory to search
        #[arg(short, long, default_value = "/")]
        path: String,
    },

    /// Fetch a PDR from the provider and validate every announced file
    Verify {
        /// Provider path of the PDR
        pdr: String,

        /// Granule id extraction regex applied to every FILE_GROUP
        #[arg(short, long)]
        granule_regex: Option<String>,

        /// JSON file of per-collection extraction settings
        #[arg(short, long)]
        collections: Option<PathBuf>,

        /// How many files to check at once
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
}

fn registry_from_args(
    granule_regex: Option<&str>,
    collections: Option<&PathBuf>,
) -> Result<CollectionRegistry> {
    let mut registry = match collections {
        Some(path) => {
            let collections = config::load_collections(path)?;
            config::build_registry(&collections)?
        },
        None => CollectionRegistry::new(),
    };

    if let Some(pattern) = granule_regex {
        registry.set_default(GranuleIdExtractor::new(pattern)?);
    }

    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let mut log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("sdp".to_string())
        .build();

    // Environment variables take precedence over flags
    log_config.apply_env()?;

    init_logging(&log_config)?;

    match cli.command {
        Command::Parse {
            input,
            granule_regex,
            collections,
        } => {
            let registry = registry_from_args(granule_regex.as_deref(), collections.as_ref())?;
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let result = parse_pdr_with_registry(&text, &registry)?;
            info!(
                "Parsed {}: {} granules, {} files, {} bytes",
                input.display(),
                result.granules_count,
                result.files_count,
                result.total_size_bytes
            );

            println!("{}", serde_json::to_string_pretty(&result)?);
        },

        Command::Discover { path } => {
            let provider = ProviderConfig::from_env()?;
            let source = provider.connect().await?;

            let pdrs = discover_pdrs(source.as_ref(), &path).await?;
            for pdr in &pdrs {
                println!("{}", pdr.name);
            }
        },

        Command::Verify {
            pdr,
            granule_regex,
            collections,
            concurrency,
        } => {
            let registry = registry_from_args(granule_regex.as_deref(), collections.as_ref())?;
            let provider = ProviderConfig::from_env()?;
            let source = provider.connect().await?;

            let text = source.fetch_text(&pdr).await?;
            let result = parse_pdr_with_registry(&text, &registry)?;
            info!(
                "Parsed {}: {} granules, {} files",
                pdr, result.granules_count, result.files_count
            );

            let summary = validate_granules(source.as_ref(), &result.granules, concurrency).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if !summary.all_valid() {
                bail!(
                    "{} of {} files failed validation",
                    summary.invalid + summary.errors,
                    summary.checked
                );
            }
        },
    }

    Ok(())
}
