// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default timeout for a bluetoothctl script.
pub const BTCTL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for adapter identity queries (hciconfig).
pub const HCICONFIG_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from launching or waiting on a short-lived subprocess
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        description: String,
        timeout: Duration,
    },
}

fn io_error(description: &str, source: std::io::Error) -> SubprocessError {
    if source.kind() == ErrorKind::NotFound {
        SubprocessError::NotFound(description.to_string())
    } else {
        SubprocessError::Io {
            description: description.to_string(),
            source,
        }
    }
}

/// Run a subprocess command with a timeout.
///
/// The child is killed when the timeout elapses: `kill_on_drop` is set
/// before spawning, and the pending `output()` future owns the child.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(io_error(description, io_err)),
        Err(_elapsed) => Err(SubprocessError::TimedOut {
            description: description.to_string(),
            timeout,
        }),
    }
}

/// Run a subprocess with `script` written to its stdin, then close stdin and
/// collect its output, all within `timeout`.
///
/// A tool that exits before consuming the whole script is not an error here;
/// its exit status decides.
pub async fn run_script_with_timeout(
    mut cmd: Command,
    script: &str,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let mut child = cmd.spawn().map_err(|e| io_error(description, e))?;
    let stdin = child.stdin.take();

    let exchange = async move {
        if let Some(mut stdin) = stdin {
            match stdin.write_all(script.as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
            // Closing stdin is what lets interactive tools see EOF
            drop(stdin);
        }
        child.wait_with_output().await
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(io_error(description, io_err)),
        Err(_elapsed) => Err(SubprocessError::TimedOut {
            description: description.to_string(),
            timeout,
        }),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
