// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bluesnap volume|mute|reconnect|switch`: façade commands.
//!
//! Payloads are forwarded as typed so the daemon is the only place that
//! validates them.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

/// A command bound for the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    Volume(String),
    Mute(String),
    Reconnect,
    /// Words of a speaker name, joined with single spaces
    Switch(Vec<String>),
}

impl ControlRequest {
    /// Command kind and raw payload as sent to the daemon
    pub fn wire(&self) -> (&'static str, String) {
        match self {
            ControlRequest::Volume(value) => ("volume", value.clone()),
            ControlRequest::Mute(state) => ("mute", state.clone()),
            ControlRequest::Reconnect => ("reconnect", String::new()),
            ControlRequest::Switch(words) => ("switch-target", words.join(" ")),
        }
    }
}

pub async fn handle(request: ControlRequest, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let (kind, payload) = request.wire();
    let outcome = client.command(kind, &payload).await?;
    match format {
        OutputFormat::Text => println!("{outcome}"),
        OutputFormat::Json => print_json(&outcome)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
