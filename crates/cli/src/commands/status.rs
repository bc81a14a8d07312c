// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bluesnap status`: bridge overview.

use std::io::{IsTerminal, Write as _};
use std::time::Duration;

use anyhow::Result;
use bluesnap_core::StatusSnapshot;

use crate::client::DaemonClient;
use crate::output::{format_status, print_json, OutputFormat};

/// ANSI sequence: move cursor to top-left without pushing scrollback.
const CURSOR_HOME: &str = "\x1B[H";

/// ANSI sequence: clear from cursor position to end of screen.
const CLEAR_TO_END: &str = "\x1B[J";

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Re-run status display in a loop (Ctrl+C to exit)
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval in seconds for --watch mode
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

pub async fn handle(args: StatusArgs, format: OutputFormat) -> Result<()> {
    if !args.watch {
        let client = DaemonClient::connect()?;
        return print_once(&client, format).await;
    }

    let is_tty = std::io::stdout().is_terminal();
    loop {
        let polled = match DaemonClient::connect() {
            Ok(client) => client.status().await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        print!("{}", watch_frame(polled, format, is_tty)?);
        std::io::stdout().flush()?;
        tokio::time::sleep(Duration::from_secs(args.interval)).await;
    }
}

/// One `--watch` refresh. JSON frames are single lines with no cursor control.
pub(crate) fn watch_frame(
    polled: std::result::Result<StatusSnapshot, String>,
    format: OutputFormat,
    is_tty: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let content = match polled {
                Ok(snapshot) => format_status(&snapshot),
                Err(message) => format!("{message}\n"),
            };
            Ok(render_frame(&content, is_tty))
        }
        OutputFormat::Json => {
            let line = match polled {
                Ok(snapshot) => serde_json::to_string(&snapshot)?,
                Err(message) => serde_json::json!({ "error": message }).to_string(),
            };
            Ok(format!("{line}\n"))
        }
    }
}

async fn print_once(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let snapshot = client.status().await?;
    match format {
        OutputFormat::Text => print!("{}", format_status(&snapshot)),
        OutputFormat::Json => print_json(&snapshot)?,
    }
    Ok(())
}

/// Wrap a frame for in-place redraw on a terminal
pub(crate) fn render_frame(content: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{CURSOR_HOME}{content}{CLEAR_TO_END}")
    } else {
        format!("{content}\n")
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
