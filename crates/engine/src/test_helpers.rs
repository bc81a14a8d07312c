// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests

use crate::link::{LinkConfig, LinkSupervisor};
use crate::observer::FakeObserver;
use crate::process::{ProcessConfig, ProcessSupervisor};
use bluesnap_adapters::{FakeCommandRunner, FakeControlAdapter, FakeProcessAdapter};
use bluesnap_core::{AudioBackend, Clock, LaunchOptions, LinkTarget, MacAddress, SystemClock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::fmt::MakeWriter;

/// Clock that follows tokio's (possibly paused) timeline
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn epoch_ms(&self) -> u64 {
        SystemClock.epoch_ms()
    }
}

pub const CONTROLLER: &str = "00:11:22:33:44:55";

pub fn kitchen() -> LinkTarget {
    LinkTarget::new("Kitchen", MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap(), 30)
}

pub fn patio() -> LinkTarget {
    LinkTarget::new("Patio", MacAddress::parse("11:22:33:44:55:66").unwrap(), 30)
}

pub fn link_config(reconnect_secs: u64) -> LinkConfig {
    LinkConfig {
        adapter: CONTROLLER.to_string(),
        reconnect_interval: Duration::from_secs(reconnect_secs),
        command_timeout: Duration::from_secs(30),
    }
}

pub fn link_supervisor<C: Clock>(
    runner: &FakeCommandRunner,
    observer: &FakeObserver,
    clock: C,
    reconnect_secs: u64,
) -> LinkSupervisor<FakeCommandRunner, FakeObserver, C> {
    LinkSupervisor::new(
        runner.clone(),
        observer.clone(),
        clock,
        link_config(reconnect_secs),
        kitchen(),
    )
}

pub const DISPLAY_NAME: &str = "bluesnap-kitchen";

pub fn launch_options() -> LaunchOptions {
    LaunchOptions {
        host: "snapserver.local".to_string(),
        port: 1704,
        latency_ms: 80,
        buffer_ms: 200,
        display_name: DISPLAY_NAME.to_string(),
        audio_backend: AudioBackend::Bluealsa,
        audio_device: None,
        stream: None,
    }
}

pub fn process_supervisor(
    adapter: &FakeProcessAdapter,
    control: &FakeControlAdapter,
) -> ProcessSupervisor<FakeProcessAdapter, FakeControlAdapter, TokioClock> {
    ProcessSupervisor::new(
        adapter.clone(),
        control.clone(),
        TokioClock,
        ProcessConfig::new("snapclient", launch_options()),
    )
    .unwrap()
}

/// Let spawned tasks run without moving the paused clock meaningfully
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn status_snapshot(taken_at_ms: u64) -> bluesnap_core::StatusSnapshot {
    let link_state = bluesnap_core::LinkState::default();
    bluesnap_core::StatusSnapshot {
        taken_at_ms,
        identity: bluesnap_core::IdentitySnapshot {
            instance_name: DISPLAY_NAME.to_string(),
            friendly_name: "Kitchen Bridge".to_string(),
        },
        bluetooth: bluesnap_core::LinkSnapshot::new(&kitchen(), &link_state),
        snapcast: bluesnap_core::ProcessSnapshot::new(&bluesnap_core::ProcessState::default()),
    }
}

/// Log output captured from a test run
#[derive(Clone, Default)]
pub struct CapturedLogs {
    logs: Arc<parking_lot::Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.logs.lock()).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` on a fresh runtime with tracing output captured
pub fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

/// True once `pid` has exited (a zombie awaiting reaping counts as exited)
pub fn process_gone(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Err(_) => true,
        Ok(stat) => stat
            .rsplit_once(") ")
            .map(|(_, rest)| rest.starts_with('Z') || rest.starts_with('X'))
            .unwrap_or(false),
    }
}

/// Poll `condition` every 20ms until it holds or `limit` passes
pub async fn eventually(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
