// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Settings whose control tool always reports a live link and whose
/// stream client just sleeps.
fn settings(dir: &Path) -> Settings {
    let tool = write_script(dir, "fake-btctl", "cat >/dev/null\necho 'Connected: yes'");
    let client = write_script(dir, "fake-snapclient", "exec sleep 600");
    settings_with(&tool, &client)
}

fn settings_with(tool: &Path, client: &Path) -> Settings {
    Settings::from_toml(&format!(
        r#"
[identity]
instance_name = "bluesnap-test"
friendly_name = "Test Bridge"

[bluetooth]
adapter = "00:11:22:33:44:55"
control_tool = "{}"

[bluetooth.speaker]
name = "Kitchen"
mac = "AA:BB:CC:DD:EE:FF"

[snapcast]
server_host = "127.0.0.1"
control_port = 1
binary = "{}"
"#,
        tool.display(),
        client.display()
    ))
    .unwrap()
}

async fn wait_for(path: &Path) {
    for _ in 0..100 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} never appeared", path.display());
}

#[test]
fn paths_live_under_state_dir() {
    let paths = Paths::in_dir("/var/lib/bluesnap");
    assert_eq!(paths.socket_path, PathBuf::from("/var/lib/bluesnap/daemon.sock"));
    assert_eq!(paths.lock_path, PathBuf::from("/var/lib/bluesnap/daemon.pid"));
    assert_eq!(paths.log_path, PathBuf::from("/var/lib/bluesnap/bluesnapd.log"));
    assert_eq!(paths.telemetry_path, PathBuf::from("/var/lib/bluesnap/telemetry.json"));
}

#[tokio::test]
async fn startup_binds_socket_and_writes_pid() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path().join("state"));

    let StartupResult { mut daemon, listener: _listener } =
        startup(&paths, &settings(dir.path())).await.unwrap();

    assert!(paths.socket_path.exists());
    let pid = std::fs::read_to_string(&paths.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(daemon.bridge.link().state().connected);
    assert!(daemon.bridge.process().is_running());

    daemon.shutdown().await;
    assert!(!paths.socket_path.exists());
    assert!(!paths.lock_path.exists());
    assert!(!daemon.bridge.process().is_running());
}

#[tokio::test]
async fn startup_publishes_telemetry_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path().join("state"));

    let StartupResult { mut daemon, .. } = startup(&paths, &settings(dir.path())).await.unwrap();
    wait_for(&paths.telemetry_path).await;

    let text = std::fs::read_to_string(&paths.telemetry_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["identity"]["instance_name"], "bluesnap-test");
    assert_eq!(json["bluetooth"]["speaker"], "Kitchen");

    daemon.shutdown().await;
}

#[tokio::test]
async fn second_daemon_fails_to_lock_and_leaves_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path().join("state"));
    let settings = settings(dir.path());

    let StartupResult { mut daemon, .. } = startup(&paths, &settings).await.unwrap();

    let err = startup(&paths, &settings).await.err().unwrap();
    assert!(matches!(err, LifecycleError::LockFailed(_)), "{err}");
    assert!(paths.socket_path.exists());
    assert!(paths.lock_path.exists());

    daemon.shutdown().await;
}

#[tokio::test]
async fn missing_stream_client_fails_fast_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path().join("state"));
    let tool = write_script(dir.path(), "fake-btctl", "cat >/dev/null");
    let settings = settings_with(&tool, &dir.path().join("no-such-snapclient"));

    let err = startup(&paths, &settings).await.err().unwrap();

    assert!(
        matches!(err, LifecycleError::Supervisor(SupervisorError::ResourceNotFound(_))),
        "{err}"
    );
    assert!(!paths.lock_path.exists());
    assert!(!paths.socket_path.exists());
}

#[tokio::test]
async fn missing_control_tool_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path().join("state"));
    let client = write_script(dir.path(), "fake-snapclient", "exec sleep 600");
    let settings = settings_with(&dir.path().join("no-such-btctl"), &client);

    let err = startup(&paths, &settings).await.err().unwrap();

    assert!(
        matches!(err, LifecycleError::Supervisor(SupervisorError::ResourceNotFound(_))),
        "{err}"
    );
    assert!(!paths.lock_path.exists());
}

#[tokio::test]
async fn stale_socket_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path().join("state"));
    std::fs::create_dir_all(&paths.state_dir).unwrap();
    std::fs::write(&paths.socket_path, b"stale").unwrap();

    let StartupResult { mut daemon, .. } = startup(&paths, &settings(dir.path())).await.unwrap();
    let meta = std::fs::symlink_metadata(&paths.socket_path).unwrap();
    assert!(std::os::unix::fs::FileTypeExt::is_socket(&meta.file_type()));

    daemon.shutdown().await;
}
