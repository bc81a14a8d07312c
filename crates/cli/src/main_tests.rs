// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use super::{format_error, Cli, Commands, OutputFormat};
use crate::client::ClientError;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn version_long() {
    let err = Cli::command()
        .try_get_matches_from(["bluesnap", "--version"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn negative_volume_is_passed_through() {
    let cli = parse(&["bluesnap", "volume", "-5"]);
    assert!(matches!(cli.command, Some(Commands::Volume { value }) if value == "-5"));
}

#[test]
fn switch_collects_every_word() {
    let cli = parse(&["bluesnap", "switch", "Living", "Room"]);
    assert!(matches!(
        cli.command,
        Some(Commands::Switch { name }) if name == ["Living", "Room"]
    ));
}

#[test]
fn switch_requires_a_name() {
    let err = Cli::try_parse_from(["bluesnap", "switch"]).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[yare::parameterized(
    before = { &["bluesnap", "-o", "json", "devices"] },
    after  = { &["bluesnap", "devices", "--output", "json"] },
)]
fn output_flag_is_global(args: &[&str]) {
    assert_eq!(parse(args).output, OutputFormat::Json);
}

#[test]
fn status_watch_interval_must_be_positive() {
    let err = Cli::try_parse_from(["bluesnap", "status", "--watch", "--interval", "0"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn not_running_error_is_printed_plainly() {
    let err = anyhow::Error::from(ClientError::DaemonNotRunning);
    assert_eq!(format_error(&err), "Daemon not running");
}

#[test]
fn distinct_causes_are_rendered() {
    let err = anyhow::Error::from(std::io::Error::other("socket gone")).context("status failed");
    assert_eq!(
        format_error(&err),
        "status failed\n\nCaused by:\n    0: socket gone"
    );
}
