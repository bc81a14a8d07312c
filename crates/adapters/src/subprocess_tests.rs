// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

#[tokio::test]
async fn run_with_timeout_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_nonzero_exit_is_not_an_error() {
    let cmd = Command::new("false");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "false")
        .await
        .unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn run_with_timeout_missing_binary_is_not_found() {
    let cmd = Command::new("/nonexistent/binary");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "nonexistent")
        .await
        .unwrap_err();
    assert!(matches!(err, SubprocessError::NotFound(ref d) if d == "nonexistent"), "got: {err}");
}

#[tokio::test]
async fn run_with_timeout_timeout_elapsed() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let err = run_with_timeout(cmd, Duration::from_millis(100), "test sleep")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, SubprocessError::TimedOut { .. }));
    assert!(message.contains("test sleep"), "got: {message}");
}

#[tokio::test]
async fn script_is_fed_through_stdin() {
    let cmd = Command::new("cat");
    let output = run_script_with_timeout(cmd, "select hci0\nquit\n", Duration::from_secs(5), "cat")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "select hci0\nquit\n");
}

#[tokio::test]
async fn script_exit_code_and_stderr_are_captured() {
    let cmd = Command::new("sh");
    let output = run_script_with_timeout(
        cmd,
        "echo boom >&2\nexit 3\n",
        Duration::from_secs(5),
        "sh",
    )
    .await
    .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "boom");
}

/// True once `pid` has exited (a zombie awaiting reaping counts as exited)
fn process_gone(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Err(_) => true,
        Ok(stat) => stat
            .rsplit_once(") ")
            .map(|(_, rest)| rest.starts_with('Z') || rest.starts_with('X'))
            .unwrap_or(false),
    }
}

#[tokio::test]
async fn script_timeout_kills_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let cmd = Command::new("sh");
    let script = format!("echo $$ > '{}'\nexec sleep 10\n", pid_file.display());

    let err = run_script_with_timeout(cmd, &script, Duration::from_millis(500), "sh")
        .await
        .unwrap_err();
    assert!(matches!(err, SubprocessError::TimedOut { .. }));

    let pid: u32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    let mut gone = process_gone(pid);
    for _ in 0..100 {
        if gone {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        gone = process_gone(pid);
    }
    assert!(gone, "child {pid} survived the timeout");
}
