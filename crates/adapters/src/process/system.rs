// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real child processes via tokio::process

use super::{ChildProcess, ProcessAdapter, ProcessError};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use bluesnap_core::ProcessTarget;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};

/// Spawns children with stdout discarded and stderr forwarded to tracing
#[derive(Clone, Default)]
pub struct SystemProcessAdapter;

impl SystemProcessAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

#[async_trait]
impl ProcessAdapter for SystemProcessAdapter {
    type Child = SystemChild;

    fn resolve(&self, program: &Path) -> Result<PathBuf, ProcessError> {
        if program.components().count() > 1 {
            return if program.is_file() {
                Ok(program.to_path_buf())
            } else {
                Err(ProcessError::NotFound(program.display().to_string()))
            };
        }
        which::which(program).map_err(|_| ProcessError::NotFound(program_name(program)))
    }

    async fn spawn(&self, target: &ProcessTarget) -> Result<SystemChild, ProcessError> {
        let mut cmd = Command::new(&target.program);
        cmd.args(&target.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| ProcessError::SpawnFailed {
            program: program_name(&target.program),
            message: e.to_string(),
        })?;
        let pid = child.id();
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr, pid));
        }
        Ok(SystemChild { child, pid })
    }
}

async fn forward_stderr(stderr: ChildStderr, pid: Option<u32>) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(target: "snapclient", pid, "{}", line);
    }
}

/// A running child spawned by [`SystemProcessAdapter`]
pub struct SystemChild {
    child: Child,
    pid: Option<u32>,
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| 128 + sig))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}

#[async_trait]
impl ChildProcess for SystemChild {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ProcessError::Wait(e.to_string()))?;
        Ok(exit_code(status))
    }

    async fn terminate(&mut self) -> Result<(), ProcessError> {
        let Some(pid) = self.pid else {
            return Ok(());
        };
        let mut cmd = Command::new("kill");
        cmd.arg("-TERM").arg(pid.to_string());
        let output = run_with_timeout(cmd, crate::env::signal_timeout(), "kill -TERM")
            .await
            .map_err(|e| ProcessError::SignalFailed {
                pid,
                message: e.to_string(),
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ProcessError::SignalFailed {
                pid,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn kill(&mut self) -> Result<(), ProcessError> {
        self.child.kill().await.map_err(|e| ProcessError::SignalFailed {
            pid: self.pid.unwrap_or_default(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
