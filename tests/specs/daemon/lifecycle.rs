//! Daemon lifecycle specs
//!
//! Startup validation, single-instance locking, and clean shutdown.

use crate::prelude::*;

#[test]
fn missing_config_file_fails_startup() {
    let bridge = Bridge::new();
    daemon_cli()
        .args(&["--config", "/nonexistent/bluesnap.toml"])
        .env("BLUESNAP_STATE_DIR", bridge.state_path())
        .fails()
        .stderr_has("failed to read config /nonexistent/bluesnap.toml");
}

#[test]
fn invalid_speaker_mac_fails_startup() {
    let bridge = Bridge::new();
    let config = std::fs::read_to_string(bridge.config_path())
        .unwrap()
        .replace("aa:bb:cc:dd:ee:ff", "aa:bb:cc");
    std::fs::write(bridge.config_path(), config).unwrap();

    bridge
        .bluesnapd()
        .fails()
        .stderr_has("bluetooth.speaker.mac");
    assert!(!bridge.socket_path().exists());
}

#[test]
fn missing_snapclient_fails_startup_and_cleans_up() {
    let bridge = Bridge::without_snapclient();
    bridge
        .bluesnapd()
        .fails()
        .stderr_has("required executable not found");

    assert!(!bridge.socket_path().exists());
    assert!(!bridge.state_path().join("daemon.pid").exists());
    assert!(bridge.daemon_log().contains("bluesnapd: starting"));
}

#[test]
fn running_daemon_answers_ping() {
    let mut bridge = Bridge::new();
    bridge.start();

    bridge
        .bluesnap()
        .args(&["ping"])
        .passes()
        .stdout_eq(&format!(
            "bluesnapd {} is running\n",
            env!("CARGO_PKG_VERSION")
        ));
}

#[test]
fn second_instance_reports_already_running() {
    let mut bridge = Bridge::new();
    bridge.start();

    bridge
        .bluesnapd()
        .fails()
        .stderr_has("bluesnapd is already running")
        .stderr_has("pid:");

    // First instance is unaffected
    bridge.bluesnap().args(&["ping"]).passes();
}

#[test]
fn shutdown_command_stops_daemon_and_removes_socket() {
    let mut bridge = Bridge::new();
    bridge.start();

    bridge
        .bluesnap()
        .args(&["shutdown"])
        .passes()
        .stdout_has("Daemon shutting down");

    assert_eq!(bridge.wait_exit(), Some(0));
    assert!(!bridge.socket_path().exists());
    assert!(!bridge.state_path().join("daemon.pid").exists());

    bridge
        .bluesnap()
        .args(&["status"])
        .fails()
        .stderr_has("Daemon not running");
}

#[test]
fn telemetry_snapshot_is_written() {
    let mut bridge = Bridge::new();
    bridge.start();

    let path = bridge.state_path().join("telemetry.json");
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || path.exists()),
        "no telemetry snapshot\nlog:\n{}",
        bridge.daemon_log()
    );
    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(snapshot["identity"]["instance_name"], "bluesnap-spec");
    assert_eq!(snapshot["bluetooth"]["speaker"], "Kitchen");
}
