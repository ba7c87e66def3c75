// crates/survey-gate-cli/src/main.rs
// ============================================================================
// Module: Survey Gate CLI Entry Point
// Description: Command dispatcher for the Survey Gate server and store tasks.
// Purpose: Run the HTTP server and one-shot operator commands from config.
// Dependencies: clap, survey-gate-config, survey-gate-core, survey-gate-server, tokio.
// ============================================================================

//! ## Overview
//! The `survey-gate` binary loads `survey-gate.toml` and either serves the
//! admission HTTP API or runs a one-shot operator command against the
//! configured store: config validation, an expiration purge, or a statistics
//! read. Output goes through `writeln!` on locked stdio handles.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use survey_gate_config::StoreType;
use survey_gate_config::SurveyGateConfig;
use survey_gate_core::Clock;
use survey_gate_core::SurveyId;
use survey_gate_core::SystemClock;
use survey_gate_server::SurveyGateServer;
use survey_gate_server::build_gate;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "survey-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the admission HTTP server.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Delete expired pending attempts from the configured store once.
    Purge(ConfigArgs),
    /// Print submission statistics for one survey.
    Stats(StatsCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration, then exit.
    Validate(ConfigArgs),
}

/// Shared config path argument.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Config file path (defaults to `SURVEY_GATE_CONFIG`, then ./survey-gate.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `stats`.
#[derive(Args, Debug, Clone)]
struct StatsCommand {
    /// Config file location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Survey identifier.
    #[arg(long, value_name = "SURVEY_ID", value_parser = parse_survey_id)]
    survey: SurveyId,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] survey_gate_config::ConfigError),
    /// Server construction or transport failed.
    #[error(transparent)]
    Server(#[from] survey_gate_server::ServerError),
    /// Admission call failed.
    #[error("{0}")]
    Admission(#[from] survey_gate_core::AdmissionError),
    /// Store call failed.
    #[error("{0}")]
    Store(#[from] survey_gate_core::StoreError),
    /// Output could not be written or encoded.
    #[error("output error: {0}")]
    Output(String),
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => command_serve(&args).await,
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => emit_lines(&command_config_validate(&args)?),
        Commands::Purge(args) => emit_lines(&command_purge(&args)?),
        Commands::Stats(args) => emit_lines(&command_stats(&args)?),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs the HTTP server until ctrl-c.
async fn command_serve(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    if config.store.store_type == StoreType::Memory {
        write_stderr_line("warning: memory store selected; attempts are lost on restart")
            .map_err(|err| CliError::Output(err.to_string()))?;
    }
    let server = SurveyGateServer::from_config(&config)?;
    write_stderr_line(&format!("survey-gate listening on {}", server.bind_addr()))
        .map_err(|err| CliError::Output(err.to_string()))?;
    server.serve().await?;
    Ok(ExitCode::SUCCESS)
}

/// Validates configuration, including the hash salt source.
fn command_config_validate(args: &ConfigArgs) -> CliResult<Vec<String>> {
    let config = load_config(args.config.as_deref())?;
    config.admission.hasher()?;
    let surveys = config.surveys.len();
    Ok(vec![format!("config ok ({surveys} seeded surveys)")])
}

/// Runs one expiration purge against the configured store.
fn command_purge(args: &ConfigArgs) -> CliResult<Vec<String>> {
    let config = load_config(args.config.as_deref())?;
    let gate = build_gate(&config, system_clock())?;
    let removed = gate.purge_expired()?;
    let mut lines = Vec::new();
    if config.store.store_type == StoreType::Memory {
        lines.push("note: memory store is empty outside a running server".to_string());
    }
    lines.push(format!("purged {removed} expired attempts"));
    Ok(lines)
}

/// Prints statistics for one survey as JSON.
fn command_stats(args: &StatsCommand) -> CliResult<Vec<String>> {
    let config = load_config(args.config.config.as_deref())?;
    let gate = build_gate(&config, system_clock())?;
    let stats = gate.stats(args.survey)?;
    let rendered =
        serde_json::to_string_pretty(&stats).map_err(|err| CliError::Output(err.to_string()))?;
    Ok(vec![rendered])
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<SurveyGateConfig> {
    Ok(SurveyGateConfig::load(path)?)
}

/// Returns the production clock.
fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Parses a positive survey identifier.
fn parse_survey_id(value: &str) -> Result<SurveyId, String> {
    value.parse::<SurveyId>().map_err(|err| err.to_string())
}

/// Writes each line to stdout.
fn emit_lines(lines: &[String]) -> CliResult<ExitCode> {
    for line in lines {
        write_stdout_line(line).map_err(|err| CliError::Output(err.to_string()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
