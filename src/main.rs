//! Salesboard - Sales & Operations Dashboard
//!
//! Command-line entry point: serve the dashboard or check the data files.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use salesboard::config::Settings;
use salesboard::data::{DataLoader, DataPaths, Dataset};
use salesboard::web::{self, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "salesboard=info,tower_http=info";

/// Real-time sales & operations dashboard over CSV data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Missing files fall back to defaults.
    #[arg(long, default_value = "dashboard.toml")]
    config: PathBuf,

    /// Directory holding the three CSV files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web dashboard (default).
    Serve,
    /// Load the CSV files, print a summary and exit.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Check => check(&settings),
    }
}

/// Config file and environment first, then command-line overrides.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(&cli.config).with_context(|| {
        format!("Failed to load configuration from {}", cli.config.display())
    })?;

    if let Some(dir) = &cli.data_dir {
        settings.data.dir = dir.clone();
    }
    if let Some(host) = &cli.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    settings.validate()?;
    Ok(settings)
}

fn load_dataset(settings: &Settings) -> anyhow::Result<Dataset> {
    let paths = DataPaths::from(&settings.data);
    DataLoader::load(&paths).with_context(|| {
        format!("Failed to load CSV data from {}", settings.data.dir.display())
    })
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr()?;
    let dataset = load_dataset(&settings)?;
    let state = Arc::new(AppState { dataset, settings });

    web::run_server(addr, state).await
}

fn check(settings: &Settings) -> anyhow::Result<()> {
    let dataset = load_dataset(settings)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Table", "Rows", "Columns"]);
    for summary in dataset.summary() {
        table.add_row(vec![
            summary.name.to_string(),
            summary.rows.to_string(),
            summary.columns.to_string(),
        ]);
    }
    println!("{table}");

    if let Some((start, end)) = dataset.date_bounds() {
        println!("Sales from {start} to {end}");
    }
    println!("Regions: {}", dataset.regions().join(", "));
    println!("Categories: {}", dataset.categories().join(", "));

    Ok(())
}
