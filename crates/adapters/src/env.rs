// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Budget for one control endpoint exchange (default: 5000ms).
pub fn control_timeout() -> Duration {
    parse_duration_ms("BLUESNAP_CONTROL_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Budget for delivering a termination signal (default: 5000ms).
pub fn signal_timeout() -> Duration {
    parse_duration_ms("BLUESNAP_SIGNAL_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}
