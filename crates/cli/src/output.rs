// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bluesnap_adapters::KnownDevice;
use bluesnap_core::{format_since, StatusSnapshot};
use clap::ValueEnum;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
pub(crate) mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Multi-line status block, ages relative to the snapshot time
pub fn format_status(snapshot: &StatusSnapshot) -> String {
    let bt = &snapshot.bluetooth;
    let sc = &snapshot.snapcast;
    let now = snapshot.taken_at_ms;

    let mut out = format!(
        "{} ({})\n",
        snapshot.identity.instance_name, snapshot.identity.friendly_name
    );
    out.push_str(&format!(
        "  bluetooth  {} {}  connected: {}  [{}]\n",
        bt.speaker,
        bt.mac,
        yes_no(bt.connected),
        bt.phase
    ));

    let mut line = format!("  snapcast   {}", sc.phase);
    if let Some(pid) = sc.pid {
        line.push_str(&format!("  pid {pid}"));
    }
    match (sc.volume, sc.muted) {
        (Some(volume), Some(true)) => line.push_str(&format!("  volume {volume}% (muted)")),
        (Some(volume), _) => line.push_str(&format!("  volume {volume}%")),
        (None, _) => line.push_str("  volume -"),
    }
    line.push_str(&format!("  restarts {}", sc.restart_count));
    if sc.connected {
        line.push_str(&format!("  started {}", format_since(sc.last_start_ms, now)));
    } else if sc.last_exit_ms.is_some() {
        let code = sc
            .last_exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        line.push_str(&format!(
            "  exited {} ({code})",
            format_since(sc.last_exit_ms, now)
        ));
    }
    out.push_str(&line);
    out.push('\n');
    out
}

/// One `NAME  ADDRESS` line per device, names padded to align
pub fn format_devices(devices: &[KnownDevice]) -> String {
    if devices.is_empty() {
        return "No known devices\n".to_string();
    }
    let width = devices.iter().map(|d| d.name.len()).max().unwrap_or(0);
    devices
        .iter()
        .map(|d| format!("{:width$}  {}\n", d.name, d.address))
        .collect()
}
