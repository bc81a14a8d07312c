//! Daemon argument handling specs

use crate::prelude::*;

#[test]
fn bluesnapd_version() {
    daemon_cli()
        .args(&["--version"])
        .passes()
        .stdout_eq(&format!("bluesnapd {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn bluesnapd_help_mentions_config_flag() {
    daemon_cli()
        .args(&["--help"])
        .passes()
        .stdout_has("--config")
        .stdout_has("--foreground");
}

#[test]
fn bluesnapd_rejects_unknown_flag() {
    daemon_cli().args(&["--bogus"]).fails().stderr_has("--bogus");
}
