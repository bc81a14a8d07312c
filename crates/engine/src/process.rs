// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervisor: keeps one stream client running.
//!
//! A monitor task owns the child handle. It waits for exit, records it,
//! sleeps the restart backoff and spawns again until cancelled. At most one
//! child exists at a time because only the monitor spawns after `start`.

use crate::control_session::{select_client, ControlOutcome, ControlSession};
use crate::error::SupervisorError;
use bluesnap_adapters::{ChildProcess, ControlAdapter, ControlClient, ProcessAdapter, ProcessError};
use bluesnap_core::{clamp_volume, Clock, LaunchOptions, ProcessPhase, ProcessSnapshot};
use bluesnap_core::{ProcessState, ProcessTarget};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delay between an exit and the next spawn
pub const RESTART_BACKOFF: Duration = Duration::from_secs(5);

/// How long `stop` waits after SIGTERM before killing
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Process supervisor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Executable name or path
    pub program: PathBuf,
    pub launch: LaunchOptions,
    pub restart_backoff: Duration,
    pub stop_timeout: Duration,
}

impl ProcessConfig {
    pub fn new(program: impl Into<PathBuf>, launch: LaunchOptions) -> Self {
        Self {
            program: program.into(),
            launch,
            restart_backoff: RESTART_BACKOFF,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}

/// How the child went down on `stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No child was alive (never started, or between restarts)
    NotRunning,
    /// Exited after SIGTERM
    Exited { code: Option<i32> },
    /// Ignored SIGTERM for the whole stop timeout and was killed
    TimedOut,
}

struct Monitor {
    cancel: CancellationToken,
    handle: JoinHandle<StopOutcome>,
}

struct ProcessInner<P, K, C> {
    adapter: P,
    control: K,
    clock: C,
    target: ProcessTarget,
    restart_backoff: Duration,
    stop_timeout: Duration,
    state: Mutex<ProcessState>,
    session: tokio::sync::Mutex<ControlSession>,
    monitor: tokio::sync::Mutex<Option<Monitor>>,
}

/// Supervises the stream client process and its volume control session
pub struct ProcessSupervisor<P, K, C> {
    inner: Arc<ProcessInner<P, K, C>>,
}

impl<P, K, C> Clone for ProcessSupervisor<P, K, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, K, C> ProcessSupervisor<P, K, C>
where
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    /// Resolve the executable and build the launch arguments.
    ///
    /// Fails with [`SupervisorError::ResourceNotFound`] when the program
    /// is not on the path.
    pub fn new(adapter: P, control: K, clock: C, config: ProcessConfig) -> Result<Self, SupervisorError> {
        let program = adapter.resolve(&config.program)?;
        let target = ProcessTarget::new(program, &config.launch);
        tracing::debug!(command = %target.command_line(), "resolved stream client");
        Ok(Self {
            inner: Arc::new(ProcessInner {
                adapter,
                control,
                clock,
                target,
                restart_backoff: config.restart_backoff,
                stop_timeout: config.stop_timeout,
                state: Mutex::new(ProcessState::default()),
                session: tokio::sync::Mutex::new(ControlSession::Unbound),
                monitor: tokio::sync::Mutex::new(None),
            }),
        })
    }

    /// Spawn the child and launch the monitor. No-op if already started.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let mut monitor = self.inner.monitor.lock().await;
        if monitor.is_some() {
            return Ok(());
        }

        *self.inner.state.lock() = ProcessState {
            phase: ProcessPhase::Starting,
            ..ProcessState::default()
        };
        let child = match self.inner.spawn().await {
            Ok(child) => child,
            Err(e) => {
                self.inner.state.lock().phase = ProcessPhase::Stopped;
                return Err(e.into());
            }
        };

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor_loop(Arc::clone(&self.inner), child, cancel.clone()));
        *monitor = Some(Monitor { cancel, handle });
        Ok(())
    }

    /// Cancel the monitor and bring the child down. No-op if not started.
    ///
    /// Drops the control session.
    pub async fn stop(&self) -> StopOutcome {
        let mut monitor = self.inner.monitor.lock().await;
        let Some(running) = monitor.take() else {
            return StopOutcome::NotRunning;
        };
        running.cancel.cancel();
        let outcome = match running.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "process monitor ended abnormally");
                StopOutcome::NotRunning
            }
        };
        {
            let mut state = self.inner.state.lock();
            state.phase = ProcessPhase::Stopped;
            state.running = false;
            state.pid = None;
        }
        *self.inner.session.lock().await = ControlSession::Unbound;
        tracing::info!(?outcome, "process supervisor stopped");
        outcome
    }

    /// Clamp to 0..=100 and apply, keeping the current mute flag
    pub async fn set_volume(&self, requested: i64) -> ControlOutcome {
        let volume = clamp_volume(requested);
        self.apply_levels(|_, muted| (volume, muted)).await
    }

    /// Apply the mute flag, keeping the current volume
    pub async fn set_mute(&self, muted: bool) -> ControlOutcome {
        self.apply_levels(|volume, _| (volume, muted)).await
    }

    /// Re-read the bound client's levels from the endpoint.
    ///
    /// Binds if possible; an unreachable endpoint leaves the session unbound.
    pub async fn refresh_control(&self) {
        let mut session = self.inner.session.lock().await;
        match self.inner.find_client().await {
            Ok(client) => *session = ControlSession::bind(&client),
            Err(reason) => {
                if session.is_bound() {
                    tracing::debug!(%reason, "control session lost");
                }
                *session = ControlSession::Unbound;
            }
        }
    }

    pub fn state(&self) -> ProcessState {
        self.inner.state.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    pub fn target(&self) -> &ProcessTarget {
        &self.inner.target
    }

    pub async fn session(&self) -> ControlSession {
        self.inner.session.lock().await.clone()
    }

    /// Process state plus the last known volume and mute
    pub async fn snapshot(&self) -> ProcessSnapshot {
        let mut snapshot = ProcessSnapshot::new(&self.state());
        if let Some((volume, muted)) = self.inner.session.lock().await.levels() {
            snapshot.volume = Some(volume);
            snapshot.muted = Some(muted);
        }
        snapshot
    }

    async fn apply_levels(&self, change: impl FnOnce(u8, bool) -> (u8, bool)) -> ControlOutcome {
        let mut session = self.inner.session.lock().await;
        let listed = self.inner.find_client().await;
        let (client_id, volume, muted) = match (listed, &*session) {
            // Levels may have been changed by another controller since binding
            (Ok(client), _) => {
                if !session.is_bound() {
                    tracing::info!(client_id = %client.id, "control session bound");
                }
                (client.id, client.volume_percent, client.muted)
            }
            (
                Err(reason),
                ControlSession::Bound {
                    client_id,
                    volume,
                    muted,
                },
            ) => {
                tracing::debug!(%reason, "could not re-read levels; using cached values");
                (client_id.clone(), *volume, *muted)
            }
            (Err(reason), ControlSession::Unbound) => {
                tracing::warn!(%reason, "volume control unavailable");
                return ControlOutcome::Unavailable { reason };
            }
        };

        let (volume, muted) = change(volume, muted);
        match self.inner.control.set_volume(&client_id, volume, muted).await {
            Ok(()) => {
                *session = ControlSession::Bound {
                    client_id: client_id.clone(),
                    volume,
                    muted,
                };
                ControlOutcome::Applied {
                    client_id,
                    volume,
                    muted,
                }
            }
            Err(e) => {
                *session = ControlSession::Unbound;
                tracing::warn!(client_id = %client_id, error = %e, "volume request failed");
                ControlOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl<P, K, C> ProcessInner<P, K, C>
where
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    async fn spawn(&self) -> Result<P::Child, ProcessError> {
        let child = self.adapter.spawn(&self.target).await?;
        let pid = child.id();
        let restart_count = {
            let mut state = self.state.lock();
            state.record_spawn(pid, self.clock.epoch_ms());
            state.restart_count
        };
        tracing::info!(pid, restart_count, "stream client started");
        Ok(child)
    }

    fn record_exit(&self, code: Option<i32>, pid: Option<u32>) {
        let clean = {
            let mut state = self.state.lock();
            state.record_exit(code, self.clock.epoch_ms());
            state.last_exit_was_clean()
        };
        if clean {
            tracing::info!(pid, exit_code = code, "stream client exited");
        } else {
            tracing::warn!(pid, exit_code = code, "stream client exited abnormally");
        }
    }

    async fn find_client(&self) -> Result<ControlClient, String> {
        let clients = self.control.list_clients().await.map_err(|e| e.to_string())?;
        let name = &self.target.display_name;
        select_client(&clients, name)
            .cloned()
            .ok_or_else(|| format!("no control client named '{}'", name))
    }

    /// SIGTERM, then kill once the stop timeout passes
    async fn shutdown_child(&self, mut child: P::Child) -> StopOutcome {
        let pid = child.id();
        if let Err(e) = child.terminate().await {
            tracing::warn!(pid, error = %e, "failed to signal stream client");
        }
        match tokio::time::timeout(self.stop_timeout, child.wait()).await {
            Ok(Ok(code)) => {
                tracing::info!(pid, exit_code = code, "stream client terminated");
                StopOutcome::Exited { code }
            }
            Ok(Err(e)) => {
                tracing::warn!(pid, error = %e, "lost track of stream client during stop");
                StopOutcome::Exited { code: None }
            }
            Err(_) => {
                tracing::error!(
                    pid,
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "stream client ignored SIGTERM; killing"
                );
                if let Err(e) = child.kill().await {
                    tracing::error!(pid, error = %e, "failed to kill stream client");
                }
                StopOutcome::TimedOut
            }
        }
    }
}

enum Wake {
    Cancelled,
    Exited(Result<Option<i32>, ProcessError>),
}

async fn monitor_loop<P, K, C>(
    inner: Arc<ProcessInner<P, K, C>>,
    mut child: P::Child,
    cancel: CancellationToken,
) -> StopOutcome
where
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    loop {
        let pid = child.id();
        let wake = tokio::select! {
            _ = cancel.cancelled() => Wake::Cancelled,
            result = child.wait() => Wake::Exited(result),
        };
        let code = match wake {
            Wake::Cancelled => return inner.shutdown_child(child).await,
            Wake::Exited(Ok(code)) => code,
            Wake::Exited(Err(e)) => {
                tracing::warn!(pid, error = %e, "lost track of stream client");
                None
            }
        };
        inner.record_exit(code, pid);

        child = loop {
            tokio::select! {
                _ = cancel.cancelled() => return StopOutcome::NotRunning,
                _ = tokio::time::sleep(inner.restart_backoff) => {}
            }
            inner.state.lock().phase = ProcessPhase::Restarting;
            match inner.spawn().await {
                Ok(next) => break next,
                Err(e) => {
                    inner.state.lock().phase = ProcessPhase::ExitedPendingRestart;
                    tracing::warn!(error = %e, "restart failed; retrying after backoff");
                }
            }
        };
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
