// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

/// Resolve state directory: BLUESNAP_STATE_DIR > XDG_STATE_HOME/bluesnap > ~/.local/state/bluesnap
///
/// Must agree with the daemon's resolution or the socket will not be found.
pub fn state_dir() -> Result<PathBuf, ClientError> {
    if let Ok(dir) = std::env::var("BLUESNAP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("bluesnap"));
    }
    let home = dirs::home_dir().ok_or(ClientError::NoStateDir)?;
    Ok(home.join(".local/state/bluesnap"))
}

/// Timeout for one IPC round trip (default: 5000ms)
pub fn timeout_ipc() -> Duration {
    std::env::var("BLUESNAP_TIMEOUT_IPC_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(bluesnap_daemon::DEFAULT_TIMEOUT)
}

/// Timeout for the answer to a command or device listing (default: 180s)
pub fn timeout_command() -> Duration {
    std::env::var("BLUESNAP_TIMEOUT_COMMAND_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(bluesnap_daemon::COMMAND_TIMEOUT)
}
