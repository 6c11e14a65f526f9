use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use listsplit::config::AppConfig;
use listsplit::http::{serve, AppState};
use listsplit::pipeline::planner::{slot_counts, DISTRIBUTION_FANOUT};
use listsplit::pipeline::{decoder, normalizer};

#[derive(Parser, Debug)]
#[command(name = "listsplit")]
#[command(version)]
#[command(about = "Distributes uploaded task lists across a fixed pool of agents")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Validate a file offline and show how it would be partitioned
    Check(CheckArgs),
}

// =============================================================================
// Serve Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "5000")]
    port: u16,

    /// Maximum number of assignments the store will hold
    #[arg(long, default_value = "10000")]
    capacity: usize,
}

// =============================================================================
// Check Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Path to the .csv, .xls, or .xlsx file
    file: PathBuf,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Serialize)]
struct CheckOutput {
    rows: usize,
    fanout: usize,
    slots: Vec<usize>,
}

// =============================================================================
// Command Handlers
// =============================================================================

async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let listen_addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    let config = AppConfig::new(listen_addr).with_store_capacity(args.capacity);

    tracing::info!(
        addr = %config.listen_addr,
        fanout = config.fanout,
        capacity = config.store_capacity,
        "Starting listsplit node"
    );

    let state = AppState::new(&config);
    serve(config.listen_addr, state).await?;

    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let buffer = std::fs::read(&args.file)?;
    let filename = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let rows = decoder::decode(&buffer, filename)?;
    let records = normalizer::normalize(&rows)?;
    let slots = slot_counts(records.len(), DISTRIBUTION_FANOUT);

    match args.output {
        OutputFormat::Json => {
            let output = CheckOutput {
                rows: records.len(),
                fanout: DISTRIBUTION_FANOUT,
                slots,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("{} valid rows", records.len());
            println!();
            println!("{:<6} COUNT", "SLOT");
            println!("{}", "-".repeat(12));
            for (i, count) in slots.iter().enumerate() {
                println!("{:<6} {}", i + 1, count);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Serve(serve_args) => run_serve(serve_args).await?,
        Commands::Check(check_args) => run_check(check_args)?,
    }

    Ok(())
}
