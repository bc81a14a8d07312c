// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn set_volume_updates_stored_client() {
    let control = FakeControlAdapter::new();
    control.add_client("c1", "kitchen", 20);

    control.set_volume("c1", 70, true).await.unwrap();

    let client = control.client("c1").unwrap();
    assert_eq!(client.volume_percent, 70);
    assert!(client.muted);
    assert_eq!(
        control.volume_calls(),
        vec![ControlCall::SetVolume {
            id: "c1".to_string(),
            percent: 70,
            muted: true
        }]
    );
}

#[tokio::test]
async fn unreachable_endpoint_fails_every_call() {
    let control = FakeControlAdapter::new();
    control.add_client("c1", "kitchen", 20);
    control.set_unreachable(true);

    assert!(control.list_clients().await.is_err());
    assert!(control.set_volume("c1", 5, false).await.is_err());
    assert_eq!(control.client("c1").unwrap().volume_percent, 20);
}

#[tokio::test]
async fn unknown_client_is_rejected() {
    let control = FakeControlAdapter::new();
    let err = control.set_volume("ghost", 5, false).await.unwrap_err();
    assert!(matches!(err, ControlError::Rpc { .. }));
}
