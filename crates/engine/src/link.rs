// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Link supervisor: keeps one Bluetooth speaker trusted and connected.
//!
//! Two background loops run per started supervisor. The watchdog polls
//! `info` and reconnects no more often than the reconnect interval. The
//! keepalive ticks every second and issues a status query once the
//! target's keepalive interval has elapsed.

use crate::error::SupervisorError;
use crate::observer::LinkObserver;
use bluesnap_adapters::{parse_bd_address, parse_devices, CommandGroup, CommandRunner};
use bluesnap_adapters::{KnownDevice, LinkStatus, RunnerError};
use bluesnap_core::{Clock, LinkPhase, LinkSnapshot, LinkState, LinkTarget, MacAddress};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Floor for the watchdog period
pub const MIN_WATCHDOG_PERIOD: Duration = Duration::from_secs(5);

/// Keepalive loop tick
const KEEPALIVE_TICK: Duration = Duration::from_secs(1);

/// Link supervisor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Adapter interface (`hci0`) or controller address
    pub adapter: String,
    /// Minimum spacing between connect attempts
    pub reconnect_interval: Duration,
    /// Hard timeout for each bluetoothctl script
    pub command_timeout: Duration,
}

impl LinkConfig {
    pub fn new(adapter: impl Into<String>, reconnect_interval: Duration) -> Self {
        Self {
            adapter: adapter.into(),
            reconnect_interval,
            command_timeout: crate::env::btctl_timeout(),
        }
    }

    pub fn watchdog_period(&self) -> Duration {
        self.reconnect_interval.max(MIN_WATCHDOG_PERIOD)
    }
}

struct LinkTasks {
    cancel: CancellationToken,
    watchdog: JoinHandle<()>,
    keepalive: JoinHandle<()>,
}

struct LinkInner<R, O, C> {
    runner: R,
    observer: O,
    clock: C,
    config: LinkConfig,
    controller: Mutex<Option<String>>,
    target: Mutex<LinkTarget>,
    state: Mutex<LinkState>,
    /// Serializes watchdog ticks with target switches
    link_ops: tokio::sync::Mutex<()>,
    tasks: tokio::sync::Mutex<Option<LinkTasks>>,
}

/// Supervises one speaker link
pub struct LinkSupervisor<R, O, C> {
    inner: Arc<LinkInner<R, O, C>>,
}

impl<R, O, C> Clone for LinkSupervisor<R, O, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, O, C> LinkSupervisor<R, O, C>
where
    R: CommandRunner,
    O: LinkObserver,
    C: Clock,
{
    pub fn new(runner: R, observer: O, clock: C, config: LinkConfig, target: LinkTarget) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                runner,
                observer,
                clock,
                config,
                controller: Mutex::new(None),
                target: Mutex::new(target),
                state: Mutex::new(LinkState::default()),
                link_ops: tokio::sync::Mutex::new(()),
                tasks: tokio::sync::Mutex::new(None),
            }),
        }
    }

    /// Prepare the adapter, trust the target, make one connect pass, then
    /// launch the watchdog and keepalive loops. No-op if already started.
    ///
    /// Only a missing control tool fails the start; other command failures
    /// are logged and left to the watchdog.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let mut tasks = self.inner.tasks.lock().await;
        if tasks.is_some() {
            return Ok(());
        }

        let target = self.target();
        *self.inner.state.lock() = LinkState {
            phase: LinkPhase::Preparing,
            ..LinkState::default()
        };
        tracing::info!(speaker = %target.name, address = %target.address, "starting link supervisor");

        if let Err(e) = self.inner.setup(&target).await {
            self.inner.state.lock().phase = LinkPhase::Stopped;
            return Err(e);
        }

        let cancel = CancellationToken::new();
        let watchdog = tokio::spawn(watchdog_loop(Arc::clone(&self.inner), cancel.clone()));
        let keepalive = tokio::spawn(keepalive_loop(Arc::clone(&self.inner), cancel.clone()));
        *tasks = Some(LinkTasks {
            cancel,
            watchdog,
            keepalive,
        });
        Ok(())
    }

    /// Cancel both loops and wait for them to finish. No-op if not started.
    ///
    /// The link itself is left as it is.
    pub async fn stop(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        let Some(running) = tasks.take() else {
            return;
        };
        running.cancel.cancel();
        for (name, handle) in [("watchdog", running.watchdog), ("keepalive", running.keepalive)] {
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "link task ended abnormally");
            }
        }
        *self.inner.state.lock() = LinkState {
            phase: LinkPhase::Stopped,
            ..LinkState::default()
        };
        tracing::info!(speaker = %self.target().name, "link supervisor stopped");
    }

    /// Replace the target, reset derived state, and trust the new address.
    ///
    /// Running loops pick up the new target on their next tick. An
    /// in-flight watchdog tick finishes before the swap.
    pub async fn switch_target(&self, target: LinkTarget) -> Result<(), SupervisorError> {
        let _ops = self.inner.link_ops.lock().await;
        let previous = {
            let mut current = self.inner.target.lock();
            std::mem::replace(&mut *current, target.clone())
        };
        self.inner.state.lock().reset_for_switch();
        tracing::info!(from = %previous, to = %target, "switching speaker");

        let controller = self.inner.controller().await;
        self.inner.trust(&controller, &target.address).await?;
        Ok(())
    }

    /// Peers bluetoothctl already knows about
    pub async fn known_devices(&self) -> Result<Vec<KnownDevice>, SupervisorError> {
        let output = self.inner.run(&[CommandGroup::new("devices")]).await?;
        Ok(parse_devices(&output))
    }

    pub fn target(&self) -> LinkTarget {
        self.inner.target.lock().clone()
    }

    pub fn state(&self) -> LinkState {
        self.inner.state.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().connected
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        let target = self.target();
        let state = self.state();
        LinkSnapshot::new(&target, &state)
    }

    #[cfg(test)]
    pub(crate) async fn watchdog_tick(&self) -> Result<(), RunnerError> {
        let _ops = self.inner.link_ops.lock().await;
        self.inner.watchdog_tick().await
    }

    #[cfg(test)]
    pub(crate) async fn keepalive_tick(&self) {
        self.inner.keepalive_tick().await
    }
}

/// Propagate a missing tool; log anything else and carry on
fn tolerate(result: Result<(), RunnerError>, step: &str) -> Result<(), SupervisorError> {
    match result {
        Ok(()) => Ok(()),
        Err(RunnerError::NotFound(tool)) => Err(SupervisorError::ResourceNotFound(tool)),
        Err(e) if e.is_timeout() => {
            tracing::error!(step, error = %e, "link setup step timed out; watchdog will retry");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(step, error = %e, "link setup step failed; watchdog will retry");
            Ok(())
        }
    }
}

fn log_tick_error(result: Result<(), RunnerError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_timeout() => tracing::error!(error = %e, "watchdog tick timed out"),
        Err(e) => tracing::warn!(error = %e, "watchdog tick failed"),
    }
}

async fn watchdog_loop<R, O, C>(inner: Arc<LinkInner<R, O, C>>, cancel: CancellationToken)
where
    R: CommandRunner,
    O: LinkObserver,
    C: Clock,
{
    let period = inner.config.watchdog_period();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(period) => {}
        }
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = async {
                let _ops = inner.link_ops.lock().await;
                inner.watchdog_tick().await
            } => result,
        };
        log_tick_error(result);
    }
    tracing::debug!("watchdog loop exited");
}

async fn keepalive_loop<R, O, C>(inner: Arc<LinkInner<R, O, C>>, cancel: CancellationToken)
where
    R: CommandRunner,
    O: LinkObserver,
    C: Clock,
{
    let mut ticker = tokio::time::interval(KEEPALIVE_TICK);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = inner.keepalive_tick() => {}
        }
    }
    tracing::debug!("keepalive loop exited");
}

impl<R, O, C> LinkInner<R, O, C>
where
    R: CommandRunner,
    O: LinkObserver,
    C: Clock,
{
    async fn run(&self, groups: &[CommandGroup]) -> Result<String, RunnerError> {
        self.runner.run(groups, self.config.command_timeout).await
    }

    /// Controller identifier for `select`, resolved once.
    ///
    /// Interface names are mapped to their BD address through hciconfig;
    /// when that fails the configured string is used as-is.
    async fn controller(&self) -> String {
        if let Some(id) = self.controller.lock().clone() {
            return id;
        }
        let adapter = self.config.adapter.clone();
        let resolved = if MacAddress::parse(&adapter).is_ok() {
            adapter
        } else {
            let output = self
                .runner
                .query("hciconfig", &[adapter.clone()], crate::env::hciconfig_timeout())
                .await;
            match output.as_deref().ok().and_then(parse_bd_address) {
                Some(address) => {
                    tracing::info!(adapter = %adapter, controller = %address, "resolved controller");
                    address.to_string()
                }
                None => {
                    tracing::warn!(adapter = %adapter, "could not resolve controller address; selecting by name");
                    adapter
                }
            }
        };
        *self.controller.lock() = Some(resolved.clone());
        resolved
    }

    /// Prepare, trust, then one connect pass
    async fn setup(&self, target: &LinkTarget) -> Result<(), SupervisorError> {
        let controller = self.controller().await;
        tolerate(self.prepare(&controller).await, "adapter preparation")?;
        tolerate(self.trust(&controller, &target.address).await, "trust")?;

        let _ops = self.link_ops.lock().await;
        match self.watchdog_tick().await {
            Err(RunnerError::NotFound(tool)) => Err(SupervisorError::ResourceNotFound(tool)),
            other => {
                log_tick_error(other);
                Ok(())
            }
        }
    }

    async fn prepare(&self, controller: &str) -> Result<(), RunnerError> {
        self.run(&[
            CommandGroup::new("select").arg(controller),
            CommandGroup::new("power").arg("on"),
            CommandGroup::new("pairable").arg("on"),
            CommandGroup::new("agent").arg("on"),
            CommandGroup::new("default-agent"),
        ])
        .await
        .map(|_| ())
    }

    async fn trust(&self, controller: &str, address: &MacAddress) -> Result<(), RunnerError> {
        self.run(&[
            CommandGroup::new("select").arg(controller),
            CommandGroup::new("trust").arg(address.as_str()),
        ])
        .await
        .map(|_| ())
    }

    async fn info(&self, controller: &str, address: &MacAddress) -> Result<String, RunnerError> {
        self.run(&[
            CommandGroup::new("select").arg(controller),
            CommandGroup::new("info").arg(address.as_str()),
        ])
        .await
    }

    /// Mark the link down; true if it was up
    fn mark_disconnected(&self) -> bool {
        let mut state = self.state.lock();
        let was_connected = state.connected;
        state.connected = false;
        state.phase = LinkPhase::Disconnected;
        was_connected
    }

    /// One watchdog pass: poll, then reconnect if due.
    ///
    /// Callers hold `link_ops`.
    async fn watchdog_tick(&self) -> Result<(), RunnerError> {
        let target = self.target.lock().clone();
        let controller = self.controller().await;

        let status = match self.info(&controller, &target.address).await {
            Ok(output) => LinkStatus::from_info(&output),
            Err(e) => {
                if self.mark_disconnected() {
                    tracing::info!(speaker = %target.name, "link lost (status query failed)");
                    self.observer.on_disconnected(&target).await;
                }
                return Err(e);
            }
        };

        if status.is_connected() {
            let mut state = self.state.lock();
            state.connected = true;
            state.phase = LinkPhase::Connected;
            return Ok(());
        }

        if self.mark_disconnected() {
            tracing::info!(speaker = %target.name, address = %target.address, "link lost");
            self.observer.on_disconnected(&target).await;
        }

        let now = self.clock.now();
        {
            let mut state = self.state.lock();
            if !state.reconnect_due(now, self.config.reconnect_interval) {
                return Ok(());
            }
            state.last_connect_attempt = Some(now);
            state.phase = LinkPhase::Connecting;
        }

        tracing::info!(speaker = %target.name, address = %target.address, "connecting");
        let result = self
            .run(&[
                CommandGroup::new("select").arg(controller.as_str()),
                CommandGroup::new("connect").arg(target.address.as_str()),
            ])
            .await;

        match result {
            Ok(_) => {
                {
                    let mut state = self.state.lock();
                    state.connected = true;
                    state.phase = LinkPhase::Connected;
                }
                tracing::info!(speaker = %target.name, "connected");
                self.observer.on_connected(&target).await;
                Ok(())
            }
            Err(e) => {
                self.state.lock().phase = LinkPhase::Disconnected;
                Err(e)
            }
        }
    }

    /// Best-effort status query once the keepalive interval has elapsed
    async fn keepalive_tick(&self) {
        let target = self.target.lock().clone();
        let now = self.clock.now();
        {
            let mut state = self.state.lock();
            if !state.keepalive_due(now, target.keepalive_interval) {
                return;
            }
            state.last_keepalive = Some(now);
        }
        let controller = self.controller().await;
        match self.info(&controller, &target.address).await {
            Ok(_) => tracing::debug!(speaker = %target.name, "keepalive sent"),
            Err(e) => tracing::debug!(speaker = %target.name, error = %e, "keepalive failed"),
        }
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
