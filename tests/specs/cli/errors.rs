//! CLI error handling specs
//!
//! Verify commands fail cleanly when the daemon is absent.

use crate::prelude::*;

#[test]
fn status_without_daemon_reports_not_running() {
    let bridge = Bridge::new();
    bridge
        .bluesnap()
        .args(&["status"])
        .fails()
        .stderr_eq("Error: Daemon not running\n");
}

#[test]
fn control_commands_without_daemon_fail() {
    let bridge = Bridge::new();
    for args in [
        &["volume", "50"][..],
        &["mute", "on"],
        &["reconnect"],
        &["switch", "Patio"],
        &["devices"],
        &["shutdown"],
    ] {
        let run = bridge.bluesnap().args(args).fails();
        assert_eq!(run.code(), Some(1), "{args:?}");
        assert!(
            run.stderr().contains("Daemon not running"),
            "{args:?}: {}",
            run.stderr()
        );
    }
}

#[test]
fn ping_without_daemon_fails() {
    let bridge = Bridge::new();
    bridge
        .bluesnap()
        .args(&["ping"])
        .fails()
        .stderr_has("Daemon not running");
}
