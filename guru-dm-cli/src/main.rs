//! `guru-dm`: runs Guru Digital Manager operations over a batch of JSON items.
//!
//! Reads an execution (resource, operation, items) as JSON from a file or
//! stdin, sends one request per item and prints the flattened output records
//! as a JSON array on stdout.
//!
//! Usage:
//!   guru-dm --config guru.toml --input execution.json
//!   cat execution.json | guru-dm --config guru.toml --continue-on-fail --pretty
//!
//! Example execution:
//!   {"resource": "contact", "operation": "getAll",
//!    "items": [{"limit": 10, "additionalFields": {"email": "ana@example.com"}}]}

use std::{
    fs,
    io::{self, Read as _},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use guru_dm_bridge::{BridgeConfig, Dispatcher, params::ExecutionInput, transport::HttpTransport};

mod observability;

use observability::{LogFormat, RunSummary, init_observability};

#[derive(Parser, Debug)]
#[command(name = "guru-dm")]
#[command(about = "Run Guru Digital Manager CRUD operations over JSON items")]
struct Args {
    /// TOML configuration file (base URL, profile, auth, endpoints, HTTP)
    #[arg(long, short = 'c', env = "GURU_DM_CONFIG")]
    config: PathBuf,

    /// Execution JSON file, or `-` for stdin
    #[arg(long, short = 'i', default_value = "-")]
    input: String,

    /// Record failed items as `{"error": ...}` instead of aborting
    #[arg(long)]
    continue_on_fail: bool,

    /// Pretty-print the output records
    #[arg(long)]
    pretty: bool,

    /// Log format (falls back to LOG_FORMAT, then pretty)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("failed to read execution from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read execution from {source}"))
    }
}

async fn run(args: Args) -> Result<()> {
    let config = BridgeConfig::from_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    let credentials = config.auth.resolve().context("failed to resolve credentials")?;

    let transport = HttpTransport::with_config(&config.http)
        .context("failed to build HTTP client")?
        .allow_insecure(config.allow_insecure_base_url);
    let dispatcher = Dispatcher::from_config(transport, &config, credentials)
        .context("failed to initialize dispatcher")?;

    let mut input = ExecutionInput::from_json(&read_input(&args.input)?)
        .context("failed to parse execution input")?;
    input.continue_on_fail |= args.continue_on_fail;

    let outcome = dispatcher.run(&input).await?;
    RunSummary::from_outcome(&outcome).log();
    let records = outcome.records;

    let output = if args.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };

    #[allow(clippy::print_stdout, reason = "stdout carries the execution output")]
    {
        println!("{output}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_observability(LogFormat::resolve(args.log_format));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "execution aborted");
            #[allow(clippy::print_stderr, reason = "final error report for the operator")]
            {
                eprintln!("Error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}
