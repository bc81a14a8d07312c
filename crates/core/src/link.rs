// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Link target identity and the link supervisor's mutable state.

use crate::mac::MacAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Remote speaker the link supervisor keeps connected.
///
/// Immutable once built; a target switch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub name: String,
    pub address: MacAddress,
    pub keepalive_interval: Duration,
}

impl LinkTarget {
    /// Build a target; the keepalive interval is floored at one second.
    pub fn new(name: impl Into<String>, address: MacAddress, keepalive_secs: u64) -> Self {
        Self {
            name: name.into(),
            address,
            keepalive_interval: Duration::from_secs(keepalive_secs.max(1)),
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Lifecycle phase of the link supervisor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPhase {
    #[default]
    Uninitialized,
    Preparing,
    Disconnected,
    Connecting,
    Connected,
    Stopped,
}

impl fmt::Display for LinkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkPhase::Uninitialized => "uninitialized",
            LinkPhase::Preparing => "preparing",
            LinkPhase::Disconnected => "disconnected",
            LinkPhase::Connecting => "connecting",
            LinkPhase::Connected => "connected",
            LinkPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Mutable link state, owned by the link supervisor.
///
/// `last_connect_attempt` is written only by the connect path (watchdog,
/// start) and `last_keepalive` only by the keepalive loop.
#[derive(Debug, Clone, Default)]
pub struct LinkState {
    pub phase: LinkPhase,
    pub connected: bool,
    pub last_connect_attempt: Option<Instant>,
    pub last_keepalive: Option<Instant>,
}

impl LinkState {
    /// True when no connect attempt has been made within `interval` of `now`
    pub fn reconnect_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_connect_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// True when the last keepalive is at least `interval` old
    pub fn keepalive_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_keepalive {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// Forget everything derived from the previous target.
    ///
    /// The phase is preserved: the loops keep running across a switch.
    pub fn reset_for_switch(&mut self) {
        self.connected = false;
        self.last_connect_attempt = None;
        self.last_keepalive = None;
        if self.phase == LinkPhase::Connected || self.phase == LinkPhase::Connecting {
            self.phase = LinkPhase::Disconnected;
        }
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
