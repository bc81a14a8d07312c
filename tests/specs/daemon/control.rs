//! Command façade specs against a running daemon with fake tools.

use crate::prelude::*;

fn status_json(bridge: &Bridge) -> serde_json::Value {
    bridge.bluesnap().args(&["-o", "json", "status"]).passes().json()
}

/// Start a bridge and wait until both the link and the stream client are up
fn connected_bridge() -> Bridge {
    let mut bridge = Bridge::new();
    bridge.start();
    let up = wait_for(SPEC_WAIT_MAX_MS, || {
        let json = status_json(&bridge);
        json["bluetooth"]["connected"] == true && json["snapcast"]["connected"] == true
    });
    assert!(up, "bridge never came up\nlog:\n{}", bridge.daemon_log());
    bridge
}

#[test]
fn status_reports_both_resources() {
    let bridge = connected_bridge();

    let json = status_json(&bridge);
    assert_eq!(json["identity"]["friendly_name"], "Spec Bridge");
    assert_eq!(json["bluetooth"]["mac"], "AA:BB:CC:DD:EE:FF");
    assert_eq!(json["snapcast"]["phase"], "running");
    assert!(json["snapcast"]["pid"].as_u64().is_some());

    bridge
        .bluesnap()
        .args(&["status"])
        .passes()
        .stdout_has("bluesnap-spec (Spec Bridge)")
        .stdout_has("Kitchen AA:BB:CC:DD:EE:FF");
}

#[test]
fn volume_without_control_endpoint_is_an_explicit_error() {
    let bridge = connected_bridge();
    bridge
        .bluesnap()
        .args(&["volume", "40"])
        .fails()
        .stderr_has("volume control unavailable");
}

#[test]
fn malformed_volume_is_rejected() {
    let bridge = connected_bridge();
    bridge.bluesnap().args(&["volume", "loud"]).fails();
    bridge.bluesnap().args(&["mute", "maybe"]).fails();
}

#[test]
fn devices_lists_known_speakers() {
    let bridge = connected_bridge();
    bridge
        .bluesnap()
        .args(&["devices"])
        .passes()
        .stdout_has("Patio")
        .stdout_has("11:22:33:44:55:66");
}

#[test]
fn switch_to_unapproved_speaker_is_rejected() {
    let bridge = connected_bridge();
    bridge
        .bluesnap()
        .args(&["switch", "Garage"])
        .fails()
        .stderr_has("not an approved target");
}

#[test]
fn switch_to_approved_speaker_retargets_link() {
    let bridge = connected_bridge();
    bridge.bluesnap().args(&["switch", "Patio"]).passes();

    let retargeted = wait_for(SPEC_WAIT_MAX_MS, || {
        status_json(&bridge)["bluetooth"]["speaker"] == "Patio"
    });
    assert!(retargeted, "log:\n{}", bridge.daemon_log());
}

#[test]
fn reconnect_is_accepted() {
    let bridge = connected_bridge();
    bridge.bluesnap().args(&["reconnect"]).passes();
    bridge.bluesnap().args(&["ping"]).passes();
}

#[test]
fn slow_reconnect_reports_its_outcome() {
    let bridge = connected_bridge();
    bridge.slow_down_control_tool();

    bridge
        .bluesnap()
        .args(&["reconnect"])
        .passes()
        .stdout_has("reconnected to Kitchen");
    assert!(
        !bridge.daemon_log().contains("Broken pipe"),
        "log:\n{}",
        bridge.daemon_log()
    );
}
