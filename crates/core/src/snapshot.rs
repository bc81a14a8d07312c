// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only status snapshots handed to telemetry and the control plane.

use crate::link::{LinkPhase, LinkState, LinkTarget};
use crate::mac::MacAddress;
use crate::process::{ProcessPhase, ProcessState};
use serde::{Deserialize, Serialize};

/// Which bridge instance produced the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub instance_name: String,
    pub friendly_name: String,
}

/// Link half of the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub connected: bool,
    pub speaker: String,
    pub mac: MacAddress,
    pub phase: LinkPhase,
}

impl LinkSnapshot {
    pub fn new(target: &LinkTarget, state: &LinkState) -> Self {
        Self {
            connected: state.connected,
            speaker: target.name.clone(),
            mac: target.address.clone(),
            phase: state.phase,
        }
    }
}

/// Stream client half of the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    pub restart_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exit_ms: Option<u64>,
    pub phase: ProcessPhase,
}

impl ProcessSnapshot {
    pub fn new(state: &ProcessState) -> Self {
        Self {
            connected: state.running,
            volume: None,
            muted: None,
            restart_count: state.restart_count,
            pid: state.pid,
            last_exit_code: state.last_exit_code,
            last_start_ms: state.last_start_ms,
            last_exit_ms: state.last_exit_ms,
            phase: state.phase,
        }
    }
}

/// Combined status of both supervised resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub taken_at_ms: u64,
    pub identity: IdentitySnapshot,
    pub bluetooth: LinkSnapshot,
    pub snapcast: ProcessSnapshot,
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
