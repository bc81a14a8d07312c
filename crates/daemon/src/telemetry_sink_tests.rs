// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bluesnap_core::{
    IdentitySnapshot, LinkSnapshot, LinkState, LinkTarget, MacAddress, ProcessSnapshot,
    ProcessState,
};

fn snapshot(taken_at_ms: u64) -> StatusSnapshot {
    let target = LinkTarget::new("Kitchen", MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap(), 30);
    StatusSnapshot {
        taken_at_ms,
        identity: IdentitySnapshot {
            instance_name: "bluesnap-kitchen".to_string(),
            friendly_name: "Kitchen Bridge".to_string(),
        },
        bluetooth: LinkSnapshot::new(&target, &LinkState::default()),
        snapcast: ProcessSnapshot::new(&ProcessState::default()),
    }
}

#[tokio::test]
async fn publish_writes_latest_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileTelemetrySink::new(dir.path().join("telemetry.json"));

    sink.publish(&snapshot(1_000)).await.unwrap();
    sink.publish(&snapshot(2_000)).await.unwrap();

    let text = std::fs::read_to_string(sink.path()).unwrap();
    let stored: StatusSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(stored, snapshot(2_000));
    assert!(!dir.path().join("telemetry.json.tmp").exists());
}

#[tokio::test]
async fn missing_directory_is_a_sink_error() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileTelemetrySink::new(dir.path().join("gone").join("telemetry.json"));

    let err = sink.publish(&snapshot(1_000)).await.unwrap_err();
    assert!(err.0.contains("telemetry.json.tmp"), "{err}");
}
