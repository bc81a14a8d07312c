// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use bluesnap_adapters::subprocess::{BTCTL_TIMEOUT, HCICONFIG_TIMEOUT};
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Hard timeout for one bluetoothctl script (default: 30s).
pub fn btctl_timeout() -> Duration {
    parse_duration_ms("BLUESNAP_BTCTL_TIMEOUT_MS").unwrap_or(BTCTL_TIMEOUT)
}

/// Timeout for the adapter identity query (default: 5s).
pub fn hciconfig_timeout() -> Duration {
    parse_duration_ms("BLUESNAP_HCICONFIG_TIMEOUT_MS").unwrap_or(HCICONFIG_TIMEOUT)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
