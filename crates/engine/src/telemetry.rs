// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic status publishing.
//!
//! The publisher asks a [`SnapshotSource`] for a snapshot on every tick and
//! immediately after each link event, and hands it to a [`TelemetrySink`].

use async_trait::async_trait;
use bluesnap_core::{LinkEvent, StatusSnapshot};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Floor for the publish interval
pub const MIN_TELEMETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("telemetry sink failed: {0}")]
pub struct TelemetryError(pub String);

/// Produces snapshots for telemetry
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn telemetry_snapshot(&self) -> StatusSnapshot;
}

/// Destination for published snapshots
#[async_trait]
pub trait TelemetrySink: Send + Sync + 'static {
    async fn publish(&self, snapshot: &StatusSnapshot) -> Result<(), TelemetryError>;
}

/// Handle to the running publish loop
pub struct TelemetryPublisher {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TelemetryPublisher {
    /// Start publishing. The first snapshot goes out immediately.
    pub fn spawn<S, K>(
        source: Arc<S>,
        sink: K,
        interval: Duration,
        events: Option<mpsc::Receiver<LinkEvent>>,
    ) -> Self
    where
        S: SnapshotSource,
        K: TelemetrySink,
    {
        let cancel = CancellationToken::new();
        let period = interval.max(MIN_TELEMETRY_INTERVAL);
        let handle = tokio::spawn(publish_loop(source, sink, period, events, cancel.clone()));
        Self { cancel, handle }
    }

    /// Cancel the loop and wait for it
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "telemetry task ended abnormally");
        }
    }
}

async fn publish_loop<S, K>(
    source: Arc<S>,
    sink: K,
    period: Duration,
    mut events: Option<mpsc::Receiver<LinkEvent>>,
    cancel: CancellationToken,
) where
    S: SnapshotSource,
    K: TelemetrySink,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            event = next_event(&mut events) => {
                tracing::debug!(?event, "link event; publishing early");
            }
        }
        let snapshot = source.telemetry_snapshot().await;
        if let Err(e) = sink.publish(&snapshot).await {
            tracing::warn!(error = %e, "telemetry publish failed");
        }
    }
    tracing::debug!("telemetry loop exited");
}

/// Next link event; pends forever once the channel is gone
async fn next_event(events: &mut Option<mpsc::Receiver<LinkEvent>>) -> LinkEvent {
    if let Some(rx) = events.as_mut() {
        if let Some(event) = rx.recv().await {
            return event;
        }
        *events = None;
    }
    std::future::pending().await
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
