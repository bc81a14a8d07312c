// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry sink that keeps the latest snapshot on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use bluesnap_core::StatusSnapshot;
use bluesnap_engine::{TelemetryError, TelemetrySink};

/// Writes each snapshot to `path`, replacing the previous one atomically.
///
/// Every publish is also emitted as a debug event on the `telemetry` target.
#[derive(Debug, Clone)]
pub struct FileTelemetrySink {
    path: PathBuf,
}

impl FileTelemetrySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl TelemetrySink for FileTelemetrySink {
    async fn publish(&self, snapshot: &StatusSnapshot) -> Result<(), TelemetryError> {
        let json =
            serde_json::to_vec_pretty(snapshot).map_err(|e| TelemetryError(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| TelemetryError(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| TelemetryError(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(
            target: "telemetry",
            bluetooth_connected = snapshot.bluetooth.connected,
            snapcast_connected = snapshot.snapcast.connected,
            restart_count = snapshot.snapcast.restart_count,
            volume = ?snapshot.snapcast.volume,
            "published status"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "telemetry_sink_tests.rs"]
mod tests;
