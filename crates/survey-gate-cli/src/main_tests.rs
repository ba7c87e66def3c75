// crates/survey-gate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Unit tests for argument parsing and one-shot commands.
// Purpose: Ensure operator commands fail closed on bad config and input.
// Dependencies: survey-gate-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Runs `config validate`, `purge`, and `stats` against temporary configs
//! backed by a temporary `SQLite` store.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;

use super::Cli;
use super::CliError;
use super::Commands;
use super::ConfigArgs;
use super::ConfigCommand;
use super::StatsCommand;
use super::command_config_validate;
use super::command_purge;
use super::command_stats;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn write_config(dir: &Path) -> PathBuf {
    let db = dir.join("gate.db");
    let config = format!(
        "[admission]\nhash_salt = \"cli-test-salt-0123456789\"\n\n\
         [store]\ntype = \"sqlite\"\npath = \"{}\"\n\n\
         [[surveys]]\nid = 1\n",
        db.display()
    );
    let path = dir.join("survey-gate.toml");
    fs::write(&path, config).unwrap();
    path
}

fn args(path: &Path) -> ConfigArgs {
    ConfigArgs {
        config: Some(path.to_path_buf()),
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_subcommands() {
    let cli = Cli::try_parse_from(["survey-gate", "config", "validate", "--config", "a.toml"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommand::Validate(_)
        }
    ));

    let cli = Cli::try_parse_from(["survey-gate", "stats", "--survey", "12"]).unwrap();
    match cli.command {
        Commands::Stats(stats) => assert_eq!(stats.survey.get(), 12),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn rejects_non_positive_survey_ids() {
    assert!(Cli::try_parse_from(["survey-gate", "stats", "--survey", "0"]).is_err());
    assert!(Cli::try_parse_from(["survey-gate", "stats", "--survey", "x"]).is_err());
}

// ============================================================================
// SECTION: Commands
// ============================================================================

#[test]
fn config_validate_reports_seed_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());
    let lines = command_config_validate(&args(&path)).unwrap();
    assert_eq!(lines, vec!["config ok (1 seeded surveys)".to_string()]);
}

#[test]
fn config_validate_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey-gate.toml");
    fs::write(&path, "[admission]\nhash_salt = \"short\"\n").unwrap();
    let err = command_config_validate(&args(&path)).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}

#[test]
fn purge_runs_against_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());
    let lines = command_purge(&args(&path)).unwrap();
    assert_eq!(lines, vec!["purged 0 expired attempts".to_string()]);
}

#[test]
fn stats_reads_seeded_survey() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());
    let survey = "1".parse().unwrap();
    let lines = command_stats(&StatsCommand {
        config: args(&path),
        survey,
    })
    .unwrap();
    let stats: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["completionRate"], 0.0);
}

#[test]
fn stats_unknown_survey_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());
    let survey = "404".parse().unwrap();
    let err = command_stats(&StatsCommand {
        config: args(&path),
        survey,
    })
    .unwrap_err();
    assert!(matches!(err, CliError::Admission(_)));
}
