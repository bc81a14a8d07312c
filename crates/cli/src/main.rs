// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bluesnap - control client for the Bluesnap daemon

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod env;
mod output;

use output::OutputFormat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::control::{self, ControlRequest};
use commands::{daemon, status};

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(
    name = "bluesnap",
    version,
    about = "Bluesnap - Bluetooth speaker bridge for Snapcast"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show link and stream client status
    Status(status::StatusArgs),
    /// Set the playback volume (0-100, out-of-range values are clamped)
    Volume {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Mute or unmute playback (on|off)
    Mute { state: String },
    /// Drop and re-establish the speaker link
    Reconnect,
    /// Switch to another approved speaker
    Switch {
        /// Speaker name as configured
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// List speakers the Bluetooth controller knows about
    Devices,
    /// Check that the daemon is answering
    Ping,
    /// Stop the daemon
    Shutdown,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
/// Otherwise we render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            // No subcommand provided, print help and exit 0
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
    };

    // Status handles its own connection so --watch survives daemon restarts
    if let Commands::Status(args) = command {
        return status::handle(args, format).await;
    }

    let client = DaemonClient::connect()?;
    match command {
        Commands::Volume { value } => {
            control::handle(ControlRequest::Volume(value), &client, format).await?
        }
        Commands::Mute { state } => {
            control::handle(ControlRequest::Mute(state), &client, format).await?
        }
        Commands::Reconnect => control::handle(ControlRequest::Reconnect, &client, format).await?,
        Commands::Switch { name } => {
            control::handle(ControlRequest::Switch(name), &client, format).await?
        }
        Commands::Devices => daemon::devices(&client, format).await?,
        Commands::Ping => daemon::ping(&client, format).await?,
        Commands::Shutdown => daemon::shutdown(&client, format).await?,
        Commands::Status(_) => {}
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
