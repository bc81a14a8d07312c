// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volume/mute capability on the stream server's control endpoint.
//!
//! The session is either `Unbound` or `Bound` to one advertised client.
//! Finding no matching client is a normal `Unbound` result, reported to
//! the caller as [`ControlOutcome::Unavailable`].

use bluesnap_adapters::ControlClient;
use serde::{Deserialize, Serialize};

/// Binding between the supervised process and a controllable client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ControlSession {
    #[default]
    Unbound,
    Bound {
        client_id: String,
        volume: u8,
        muted: bool,
    },
}

impl ControlSession {
    pub fn bind(client: &ControlClient) -> Self {
        ControlSession::Bound {
            client_id: client.id.clone(),
            volume: client.volume_percent,
            muted: client.muted,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, ControlSession::Bound { .. })
    }

    /// Last known `(volume, muted)` when bound
    pub fn levels(&self) -> Option<(u8, bool)> {
        match self {
            ControlSession::Unbound => None,
            ControlSession::Bound { volume, muted, .. } => Some((*volume, *muted)),
        }
    }
}

/// Result of a volume or mute request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ControlOutcome {
    Applied {
        client_id: String,
        volume: u8,
        muted: bool,
    },
    /// Nothing was changed
    Unavailable { reason: String },
}

/// Pick the client announcing `display_name`.
///
/// A client matches on friendly name or identifier. Several matches are
/// ordered by identifier and the first wins.
pub fn select_client<'a>(clients: &'a [ControlClient], display_name: &str) -> Option<&'a ControlClient> {
    clients
        .iter()
        .filter(|c| c.friendly_name == display_name || c.id == display_name)
        .min_by(|a, b| a.id.cmp(&b.id))
}

#[cfg(test)]
#[path = "control_session_tests.rs"]
mod tests;
