// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Link connectivity notifications.

use crate::link::LinkTarget;
use crate::mac::MacAddress;
use serde::{Deserialize, Serialize};

/// Connectivity transition reported by the link supervisor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkEvent {
    Connected { speaker: String, mac: MacAddress },
    Disconnected { speaker: String, mac: MacAddress },
}

impl LinkEvent {
    pub fn connected(target: &LinkTarget) -> Self {
        LinkEvent::Connected {
            speaker: target.name.clone(),
            mac: target.address.clone(),
        }
    }

    pub fn disconnected(target: &LinkTarget) -> Self {
        LinkEvent::Disconnected {
            speaker: target.name.clone(),
            mac: target.address.clone(),
        }
    }

    pub fn mac(&self) -> &MacAddress {
        match self {
            LinkEvent::Connected { mac, .. } | LinkEvent::Disconnected { mac, .. } => mac,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
