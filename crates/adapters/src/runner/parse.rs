// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interpreters for bluetoothctl and hciconfig status text

use bluesnap_core::MacAddress;
use serde::{Deserialize, Serialize};

/// Connectivity reported by a device `info` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    /// The query reported `Connected: no` or had no parseable status line
    Disconnected,
}

impl LinkStatus {
    /// Scan `info` output for a `Connected:` line.
    ///
    /// The key is matched case-insensitively and the value trimmed. The
    /// first such line decides.
    pub fn from_info(output: &str) -> Self {
        for line in output.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("connected") {
                return if value.trim().eq_ignore_ascii_case("yes") {
                    LinkStatus::Connected
                } else {
                    LinkStatus::Disconnected
                };
            }
        }
        LinkStatus::Disconnected
    }

    pub fn is_connected(self) -> bool {
        self == LinkStatus::Connected
    }
}

/// A peer listed by `devices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownDevice {
    pub address: MacAddress,
    pub name: String,
}

/// Collect `Device <addr> <name>` lines, skipping malformed ones.
///
/// The marker may follow a prompt or a `[NEW]` tag. Later duplicates of an
/// address are dropped.
pub fn parse_devices(output: &str) -> Vec<KnownDevice> {
    let mut devices: Vec<KnownDevice> = Vec::new();
    for line in output.lines() {
        let Some(rest) = line.find("Device ").map(|at| &line[at + "Device ".len()..]) else {
            continue;
        };
        let rest = rest.trim();
        let (addr, name) = match rest.split_once(char::is_whitespace) {
            Some((addr, name)) => (addr, name.trim()),
            None => (rest, ""),
        };
        let Ok(address) = MacAddress::parse(addr) else {
            continue;
        };
        if name.is_empty() || devices.iter().any(|d| d.address == address) {
            continue;
        }
        devices.push(KnownDevice {
            address,
            name: name.to_string(),
        });
    }
    devices
}

/// Read the controller address from `hciconfig <adapter>` output
pub fn parse_bd_address(output: &str) -> Option<MacAddress> {
    output.lines().find_map(|line| {
        let (_, rest) = line.split_once("BD Address:")?;
        let token = rest.split_whitespace().next()?;
        MacAddress::parse(token).ok()
    })
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
