// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn options() -> LaunchOptions {
    LaunchOptions {
        host: "snapserver.local".to_string(),
        port: 1704,
        latency_ms: 80,
        buffer_ms: 200,
        display_name: "bluesnap-kitchen".to_string(),
        audio_backend: AudioBackend::Bluealsa,
        audio_device: None,
        stream: None,
    }
}

#[test]
fn args_follow_fixed_order() {
    assert_eq!(
        options().to_args(),
        vec![
            "--host",
            "snapserver.local",
            "--port",
            "1704",
            "--latency",
            "80",
            "--buffer",
            "200",
            "--name",
            "bluesnap-kitchen",
            "--soundcard",
            "bluealsa",
        ]
    );
}

#[test]
fn explicit_device_overrides_backend() {
    let opts = LaunchOptions {
        audio_backend: AudioBackend::Alsa,
        audio_device: Some("hw:1,0".to_string()),
        ..options()
    };
    assert_eq!(opts.sound_card().as_deref(), Some("hw:1,0"));
}

#[test]
fn blank_device_falls_back_to_backend() {
    let opts = LaunchOptions {
        audio_backend: AudioBackend::Pipewire,
        audio_device: Some("  ".to_string()),
        ..options()
    };
    assert_eq!(opts.sound_card().as_deref(), Some("pipewire"));
}

#[test]
fn stream_is_appended_last() {
    let opts = LaunchOptions {
        stream: Some("Kitchen".to_string()),
        ..options()
    };
    let args = opts.to_args();
    assert_eq!(&args[args.len() - 2..], ["--stream", "Kitchen"]);
}

#[test]
fn target_carries_display_name_and_command_line() {
    let target = ProcessTarget::new("/usr/bin/snapclient", &options());
    assert_eq!(target.display_name, "bluesnap-kitchen");
    assert!(target
        .command_line()
        .starts_with("/usr/bin/snapclient --host snapserver.local"));
}

#[test]
fn spawn_and_exit_bookkeeping() {
    let mut state = ProcessState::default();

    state.record_spawn(Some(100), 1_000);
    assert!(state.running);
    assert_eq!(state.restart_count, 1);
    assert_eq!(state.phase, ProcessPhase::Running);

    state.record_exit(Some(137), 2_000);
    assert!(!state.running);
    assert_eq!(state.pid, None);
    assert_eq!(state.last_exit_code, Some(137));
    assert!(!state.last_exit_was_clean());

    state.record_spawn(Some(101), 7_000);
    assert_eq!(state.restart_count, 2);
    assert_eq!(state.last_start_ms, Some(7_000));
}

#[test]
fn signal_exit_is_not_clean() {
    let mut state = ProcessState::default();
    state.record_exit(None, 1);
    assert!(!state.last_exit_was_clean());
}
