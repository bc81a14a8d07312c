// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;
use crate::protocol::DEFAULT_TIMEOUT;

/// System-wide config location used when no per-user file exists
pub const SYSTEM_CONFIG_PATH: &str = "/etc/bluesnap/bluesnap.toml";

/// Resolve state directory: BLUESNAP_STATE_DIR > XDG_STATE_HOME/bluesnap > ~/.local/state/bluesnap
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("BLUESNAP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("bluesnap"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/bluesnap"))
}

/// Resolve config file: BLUESNAP_CONFIG > user config dir (if present) > /etc
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("BLUESNAP_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(user) = dirs::config_dir().map(|d| d.join("bluesnap").join("bluesnap.toml")) {
        if user.exists() {
            return user;
        }
    }
    PathBuf::from(SYSTEM_CONFIG_PATH)
}

/// Per-connection IPC budget (default: 5000ms).
pub fn ipc_timeout() -> Duration {
    std::env::var("BLUESNAP_TIMEOUT_IPC_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
