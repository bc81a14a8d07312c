//! CLI help and version specs

use crate::prelude::*;

#[test]
fn bluesnap_help_lists_commands() {
    let run = cli().args(&["--help"]).passes();
    let stdout = run.stdout();
    for command in [
        "status", "volume", "mute", "reconnect", "switch", "devices", "ping", "shutdown",
    ] {
        assert!(stdout.contains(command), "help missing '{command}':\n{stdout}");
    }
}

#[test]
fn bluesnap_version_prints_package_version() {
    cli()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn bluesnap_without_command_shows_usage() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn bluesnap_rejects_unknown_command() {
    cli().args(&["teleport"]).fails().stderr_has("teleport");
}

#[test]
fn switch_requires_a_speaker_name() {
    cli().args(&["switch"]).fails().stderr_has("<NAME>");
}

#[test]
fn status_rejects_zero_watch_interval() {
    cli()
        .args(&["status", "--watch", "--interval", "0"])
        .fails()
        .stderr_has("interval");
}
