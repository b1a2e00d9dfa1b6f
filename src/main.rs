//! sg-reconcile - SG liability versus disbursement reconciliation
//!
//! - `run` reconciles CSV exports from a data directory and prints a report
//! - `serve` exposes the same pipeline as `POST /reconcile`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sg_reconciliation::api::{AppState, create_router};
use sg_reconciliation::calculation::ReconciliationEngine;
use sg_reconciliation::config::{ConfigLoader, ReconciliationConfig};
use sg_reconciliation::error::EngineError;
use sg_reconciliation::report::{render_json, render_table};
use sg_reconciliation::sources::{SourcePaths, load_tables};

/// Reconcile Superannuation Guarantee liability against disbursements
#[derive(Parser)]
#[command(name = "sg-reconcile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile CSV source files and print the result
    Run(RunArgs),

    /// Serve the reconciliation API over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory holding payslips.csv, paycodes.csv and disbursements.csv
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Payslips file (overrides the data directory default)
    #[arg(long)]
    payslips: Option<PathBuf>,

    /// Pay codes file (overrides the data directory default)
    #[arg(long)]
    pay_codes: Option<PathBuf>,

    /// Disbursements file (overrides the data directory default)
    #[arg(long)]
    disbursements: Option<PathBuf>,

    /// Configuration directory containing reconciliation.yaml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Configuration directory containing reconciliation.yaml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Serve(args) => serve(args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "sg-reconcile failed");
            ExitCode::FAILURE
        }
    }
}

fn build_engine(config_dir: Option<&PathBuf>) -> Result<ReconciliationEngine, EngineError> {
    let config = match config_dir {
        Some(dir) => ConfigLoader::load(dir)?.into_config(),
        None => ReconciliationConfig::default(),
    };
    info!(
        jurisdiction = %config.jurisdiction.code,
        sg_rate = %config.sg_rate,
        "Loaded reconciliation rules"
    );
    ReconciliationEngine::new(config)
}

fn run(args: RunArgs) -> Result<(), EngineError> {
    let engine = build_engine(args.config.as_ref())?;

    let defaults = SourcePaths::in_dir(&args.data_dir);
    let paths = SourcePaths {
        payslips: args.payslips.unwrap_or(defaults.payslips),
        pay_codes: args.pay_codes.unwrap_or(defaults.pay_codes),
        disbursements: args.disbursements.unwrap_or(defaults.disbursements),
    };

    let tables = load_tables(&paths)?;
    let result = engine.reconcile(&tables)?;

    let rendered = match args.format {
        OutputFormat::Table => render_table(&result),
        OutputFormat::Json => render_json(&result)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<(), EngineError> {
    let engine = build_engine(args.config.as_ref())?;
    let router = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|e| EngineError::InvalidConfig {
            message: format!("cannot listen on {}: {}", args.addr, e),
        })?;
    info!(addr = %args.addr, "Listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| EngineError::ComputationError {
            stage: "server".to_string(),
            message: e.to_string(),
        })
}
