// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control endpoint adapters for out-of-band volume and mute

mod snapcast;

pub use snapcast::{SnapcastControl, DEFAULT_CONTROL_PORT};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ControlCall, FakeControlAdapter};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A controllable entity advertised by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlClient {
    pub id: String,
    pub friendly_name: String,
    pub volume_percent: u8,
    pub muted: bool,
}

/// Errors from the control endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("control endpoint {endpoint} unreachable: {message}")]
    Unreachable { endpoint: String, message: String },
    #[error("control endpoint {endpoint} timed out after {}ms", .after.as_millis())]
    Timeout { endpoint: String, after: Duration },
    #[error("control request rejected ({code}): {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed control response: {0}")]
    Protocol(String),
}

/// Adapter for the stream server's control endpoint
#[async_trait]
pub trait ControlAdapter: Clone + Send + Sync + 'static {
    /// List every controllable entity
    async fn list_clients(&self) -> Result<Vec<ControlClient>, ControlError>;

    /// Apply a volume/mute pair to one entity
    async fn set_volume(&self, client_id: &str, percent: u8, muted: bool)
        -> Result<(), ControlError>;
}
