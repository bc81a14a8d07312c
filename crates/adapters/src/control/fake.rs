// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake control endpoint for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ControlAdapter, ControlClient, ControlError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded control call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    ListClients,
    SetVolume {
        id: String,
        percent: u8,
        muted: bool,
    },
}

#[derive(Default)]
struct FakeControlState {
    clients: Vec<ControlClient>,
    unreachable: bool,
    calls: Vec<ControlCall>,
}

/// In-memory control endpoint; `set_volume` updates the stored client
#[derive(Clone, Default)]
pub struct FakeControlAdapter {
    inner: Arc<Mutex<FakeControlState>>,
}

impl FakeControlAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_client(&self, id: &str, friendly_name: &str, volume_percent: u8) {
        self.inner.lock().clients.push(ControlClient {
            id: id.to_string(),
            friendly_name: friendly_name.to_string(),
            volume_percent,
            muted: false,
        });
    }

    pub fn clear_clients(&self) {
        self.inner.lock().clients.clear();
    }

    /// Make every call fail as if the endpoint were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unreachable = unreachable;
    }

    pub fn client(&self, id: &str) -> Option<ControlClient> {
        self.inner.lock().clients.iter().find(|c| c.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.inner.lock().calls.clone()
    }

    /// Only the volume-set calls
    pub fn volume_calls(&self) -> Vec<ControlCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ControlCall::SetVolume { .. }))
            .collect()
    }

    fn check_reachable(&self, state: &FakeControlState) -> Result<(), ControlError> {
        if state.unreachable {
            return Err(ControlError::Unreachable {
                endpoint: "fake:1705".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ControlAdapter for FakeControlAdapter {
    async fn list_clients(&self) -> Result<Vec<ControlClient>, ControlError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ControlCall::ListClients);
        self.check_reachable(&inner)?;
        Ok(inner.clients.clone())
    }

    async fn set_volume(
        &self,
        client_id: &str,
        percent: u8,
        muted: bool,
    ) -> Result<(), ControlError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ControlCall::SetVolume {
            id: client_id.to_string(),
            percent,
            muted,
        });
        self.check_reachable(&inner)?;
        match inner.clients.iter_mut().find(|c| c.id == client_id) {
            Some(client) => {
                client.volume_percent = percent;
                client.muted = muted;
                Ok(())
            }
            None => Err(ControlError::Rpc {
                code: -32603,
                message: format!("client not found: {}", client_id),
            }),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
