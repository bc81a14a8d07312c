// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `bluesnap` and `bluesnapd`.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use bluesnap_adapters::KnownDevice;
use bluesnap_core::StatusSnapshot;
use bluesnap_engine::CommandOutcome;
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_message, read_request, read_response, write_message, write_request,
    write_response, ProtocolError, COMMAND_TIMEOUT, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
};

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Current status snapshot
    Status,

    /// Control command, passed through as raw text
    Command { kind: String, payload: String },

    /// Peers bluetoothctl knows about
    Devices,

    /// Request daemon shutdown
    Shutdown,
}

impl Request {
    /// Whether answering may wait on external tools rather than in-memory state
    pub fn waits_on_tools(&self) -> bool {
        matches!(self, Request::Command { .. } | Request::Devices)
    }
}

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    Status { snapshot: Box<StatusSnapshot> },

    /// Command was applied
    CommandApplied { outcome: CommandOutcome },

    Devices { devices: Vec<KnownDevice> },

    /// Daemon is shutting down
    ShuttingDown,

    /// Request could not be satisfied
    Error { message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
