// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::control::{ControlAdapter, ControlClient, ControlError};
use crate::process::{ProcessAdapter, ProcessError};
use crate::runner::{CommandGroup, CommandRunner, RunnerError};
use async_trait::async_trait;
use bluesnap_core::ProcessTarget;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Wrapper that adds tracing to any CommandRunner
#[derive(Clone)]
pub struct TracedRunner<R> {
    inner: R,
}

impl<R> TracedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for TracedRunner<R> {
    async fn run(
        &self,
        groups: &[CommandGroup],
        timeout: Duration,
    ) -> Result<String, RunnerError> {
        let script = groups
            .iter()
            .map(CommandGroup::line)
            .collect::<Vec<_>>()
            .join("; ");
        async {
            let start = Instant::now();
            let result = self.inner.run(groups, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(out) => {
                    tracing::debug!(elapsed_ms, output_len = out.len(), "completed");
                    for line in out.lines().filter(|l| !l.trim().is_empty()) {
                        tracing::debug!(target: "bluetoothctl", "{}", line);
                    }
                }
                Err(e) if e.is_timeout() => tracing::error!(elapsed_ms, error = %e, "timed out"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "failed"),
            }
            result
        }
        .instrument(tracing::debug_span!("btctl.run", script = %script))
        .await
    }

    async fn query(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, RunnerError> {
        let result = self.inner.query(program, args, timeout).await;
        if let Err(ref e) = result {
            tracing::warn!(program, error = %e, "query failed");
        }
        result
    }
}

/// Wrapper that adds tracing to any ProcessAdapter
#[derive(Clone)]
pub struct TracedProcess<P> {
    inner: P,
}

impl<P> TracedProcess<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProcessAdapter> ProcessAdapter for TracedProcess<P> {
    type Child = P::Child;

    fn resolve(&self, program: &Path) -> Result<PathBuf, ProcessError> {
        let result = self.inner.resolve(program);
        match &result {
            Ok(path) => tracing::debug!(program = %program.display(), path = %path.display(), "resolved"),
            Err(e) => tracing::error!(program = %program.display(), error = %e, "not resolvable"),
        }
        result
    }

    async fn spawn(&self, target: &ProcessTarget) -> Result<P::Child, ProcessError> {
        use crate::process::ChildProcess;
        async {
            tracing::info!(command = %target.command_line(), "starting");
            let start = Instant::now();
            let result = self.inner.spawn(target).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(child) => tracing::info!(pid = ?child.id(), elapsed_ms, "process spawned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        }
        .instrument(tracing::info_span!("process.spawn", name = %target.display_name))
        .await
    }
}

/// Wrapper that adds tracing to any ControlAdapter
#[derive(Clone)]
pub struct TracedControl<C> {
    inner: C,
}

impl<C> TracedControl<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ControlAdapter> ControlAdapter for TracedControl<C> {
    async fn list_clients(&self) -> Result<Vec<ControlClient>, ControlError> {
        async {
            let start = Instant::now();
            let result = self.inner.list_clients().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(clients) => tracing::debug!(elapsed_ms, clients = clients.len(), "listed"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "list failed"),
            }
            result
        }
        .instrument(tracing::debug_span!("control.list"))
        .await
    }

    async fn set_volume(
        &self,
        client_id: &str,
        percent: u8,
        muted: bool,
    ) -> Result<(), ControlError> {
        async {
            let start = Instant::now();
            let result = self.inner.set_volume(client_id, percent, muted).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "volume applied"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "set_volume failed"),
            }
            result
        }
        .instrument(tracing::info_span!("control.set_volume", client_id, percent, muted))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
