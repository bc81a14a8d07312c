// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bluesnap ping|devices|shutdown`: daemon queries and management

use anyhow::Result;
use serde_json::json;

use crate::client::DaemonClient;
use crate::output::{format_devices, print_json, OutputFormat};

pub async fn ping(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.ping().await?;
    let version = client.hello().await?;
    match format {
        OutputFormat::Text => println!("bluesnapd {version} is running"),
        OutputFormat::Json => print_json(&json!({ "running": true, "version": version }))?,
    }
    Ok(())
}

pub async fn devices(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let devices = client.devices().await?;
    match format {
        OutputFormat::Text => print!("{}", format_devices(&devices)),
        OutputFormat::Json => print_json(&devices)?,
    }
    Ok(())
}

pub async fn shutdown(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.shutdown().await?;
    match format {
        OutputFormat::Text => println!("Daemon shutting down"),
        OutputFormat::Json => print_json(&json!({ "shutting_down": true }))?,
    }
    Ok(())
}
