//! smashly-check - Main Entry Point
//!
//! Runs the catalog API suite, the browser E2E suite, or both, prints a
//! result table and writes `<output>/<suite>-results.json`.
//!
//! Exit codes: 0 when every scenario passed, 1 when any scenario failed,
//! 2 when a suite could not run at all.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use smashly_cli::commands::{self, api, e2e, ConfigArgs, EXIT_FATAL};
use smashly_cli::output::{self, OutputFormat};

/// Smashly catalog checks - API and browser E2E suites
#[derive(Parser)]
#[command(name = "smashly-check")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog API scenarios
    Api(api::ApiArgs),

    /// Run the browser E2E scenarios
    E2e(e2e::E2eArgs),

    /// Run the API suite, then the E2E suite
    All,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<u8> {
    let config = cli.config.resolve()?;
    debug!("Resolved configuration: {:?}", config);

    let mut results = Vec::new();
    match &cli.command {
        Commands::Api(args) => results.extend(api::execute(args, &config, cli.format).await?),
        Commands::E2e(args) => results.extend(e2e::execute(args, &config, cli.format).await?),
        Commands::All => {
            results.extend(api::execute(&api::ApiArgs::default(), &config, cli.format).await?);
            results.extend(e2e::execute(&e2e::E2eArgs::default(), &config, cli.format).await?);
        }
    }

    let code = commands::exit_code(&results);
    info!("Finished {} suite(s), exit code {}", results.len(), code);
    Ok(code)
}
