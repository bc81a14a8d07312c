// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bluesnap_adapters::{
    ScriptRunner, SnapcastControl, SystemProcessAdapter, TracedControl, TracedProcess,
    TracedRunner,
};
use bluesnap_core::SystemClock;
use bluesnap_engine::{
    Bridge, ChannelObserver, LinkConfig, LinkSupervisor, ProcessConfig, ProcessSupervisor,
    SupervisorError, TelemetryPublisher,
};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{ConfigError, Settings};
use crate::telemetry_sink::FileTelemetrySink;

/// Bridge with concrete adapter types (wrapped with tracing)
pub type DaemonBridge = Bridge<
    TracedRunner<ScriptRunner>,
    ChannelObserver,
    TracedProcess<SystemProcessAdapter>,
    TracedControl<SnapcastControl>,
    SystemClock,
>;

/// Capacity of the link event channel feeding telemetry
const LINK_EVENT_CAPACITY: usize = 16;

/// Files the daemon owns under its state directory
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root state directory (e.g. ~/.local/state/bluesnap)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Latest published snapshot
    pub telemetry_path: PathBuf,
}

impl Paths {
    /// Resolve paths from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::in_dir(crate::env::state_dir()?))
    }

    pub fn in_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("bluesnapd.log"),
            telemetry_path: state_dir.join("telemetry.json"),
            state_dir,
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),
}

/// Running daemon state.
///
/// The socket listener is returned separately from startup to be spawned
/// as a Listener task.
pub struct Daemon {
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub bridge: Arc<DaemonBridge>,
    telemetry: Option<TelemetryPublisher>,
    /// When daemon started
    pub start_time: Instant,
}

/// Result of daemon startup
pub struct StartupResult {
    pub daemon: Daemon,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

/// Start the daemon
pub async fn startup(paths: &Paths, settings: &Settings) -> Result<StartupResult, LifecycleError> {
    match startup_inner(paths, settings).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Those files belong to the already-running daemon
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(paths);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(paths: &Paths, settings: &Settings) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&paths.state_dir)?;

    // 2. Acquire lock file FIRST. Open without truncating so a running
    // daemon's PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Resolve both external programs before touching any hardware
    let runner = ScriptRunner::new(&settings.control_tool)
        .resolve()
        .map_err(SupervisorError::from)?;
    let process = ProcessSupervisor::new(
        TracedProcess::new(SystemProcessAdapter::new()),
        TracedControl::new(SnapcastControl::new(
            settings.launch.host.clone(),
            settings.control_port,
        )),
        SystemClock,
        ProcessConfig::new(&settings.client_binary, settings.launch.clone()),
    )?;

    let (event_tx, event_rx) = mpsc::channel(LINK_EVENT_CAPACITY);
    let link = LinkSupervisor::new(
        TracedRunner::new(runner),
        ChannelObserver::new(event_tx),
        SystemClock,
        LinkConfig::new(&settings.adapter, settings.reconnect_interval),
        settings.speaker.clone(),
    );
    let bridge = Arc::new(Bridge::new(
        settings.identity.clone(),
        link,
        process,
        settings.known_speakers.clone(),
        SystemClock,
    ));

    // 4. Bring up the link and the stream client
    bridge.start().await?;

    // 5. Bind the control socket
    let listener = match bind_socket(&paths.socket_path) {
        Ok(listener) => listener,
        Err(e) => {
            bridge.shutdown().await;
            return Err(e);
        }
    };

    // 6. Publish telemetry
    let telemetry = TelemetryPublisher::spawn(
        Arc::clone(&bridge),
        FileTelemetrySink::new(&paths.telemetry_path),
        settings.telemetry_interval,
        Some(event_rx),
    );

    info!(
        instance = %settings.identity.instance_name,
        suffix = settings.unique_suffix.as_deref().unwrap_or(""),
        speaker = %settings.speaker.name,
        "daemon started"
    );

    Ok(StartupResult {
        daemon: Daemon {
            paths: paths.clone(),
            lock_file,
            bridge,
            telemetry: Some(telemetry),
            start_time: Instant::now(),
        },
        listener,
    })
}

fn bind_socket(path: &Path) -> Result<UnixListener, LifecycleError> {
    // A stale socket from a crashed daemon would make bind fail
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    UnixListener::bind(path).map_err(|e| LifecycleError::BindFailed(path.to_path_buf(), e))
}

impl Daemon {
    /// Stop telemetry, then the stream client, then the link, then remove
    /// the socket and PID files.
    pub async fn shutdown(&mut self) {
        info!("Shutting down daemon...");

        if let Some(telemetry) = self.telemetry.take() {
            telemetry.stop().await;
        }
        self.bridge.shutdown().await;

        if self.paths.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &Paths) {
    if paths.socket_path.exists() {
        let _ = std::fs::remove_file(&paths.socket_path);
    }
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
