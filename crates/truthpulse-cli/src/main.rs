//! truthpulse CLI — run the collection server and inspect stored responses.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use truthpulse_core::export::ExportFormat;

mod commands;

#[derive(Parser)]
#[command(
    name = "truthpulse",
    version,
    about = "Deepfake-awareness survey scoring and analytics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP collection server
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the record store and export
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Route GET /api/seed
        #[arg(long)]
        seed_endpoint: bool,
    },

    /// Print aggregate metrics over the stored responses
    Metrics {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding the record store
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Rebuild a tabular export from the record store
    Export {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding the record store
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Export format: xlsx or csv
        #[arg(long, default_value = "xlsx")]
        format: ExportFormat,

        /// Output file (default: the configured export file for the format)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Score one response record
    Score {
        /// Response record JSON file
        #[arg(long)]
        record: PathBuf,

        /// Quiz catalog TOML (default: built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run the simulated media scan
    Scan {
        /// RNG seed for a reproducible scan
        #[arg(long)]
        seed: Option<u64>,

        /// Milliseconds between progress updates
        #[arg(long, default_value = "120")]
        tick_ms: u64,
    },

    /// Validate a quiz catalog TOML file
    Validate {
        /// Path to the catalog file
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Create a starter config and quiz catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            port,
            data_dir,
            seed_endpoint,
        } => commands::serve::execute(config, port, data_dir, seed_endpoint).await,
        Commands::Metrics {
            config,
            data_dir,
            format,
        } => commands::metrics::execute(config, data_dir, format).await,
        Commands::Export {
            config,
            data_dir,
            format,
            output,
        } => commands::export::execute(config, data_dir, format, output).await,
        Commands::Score {
            record,
            catalog,
            format,
        } => commands::score::execute(record, catalog, format),
        Commands::Scan { seed, tick_ms } => commands::scan::execute(seed, tick_ms).await,
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
