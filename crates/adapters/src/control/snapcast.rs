// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapcast server JSON-RPC control over TCP
//!
//! Requests and responses are newline-delimited JSON-RPC 2.0 objects. The
//! server interleaves notifications (no `id`) which are skipped.

use super::{ControlAdapter, ControlClient, ControlError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Snapcast server's default control (JSON-RPC) port
pub const DEFAULT_CONTROL_PORT: u16 = 1705;

/// Largest response line accepted from the server
const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Stateless Snapcast control client; each call opens its own connection
#[derive(Clone)]
pub struct SnapcastControl {
    host: String,
    port: u16,
    timeout: Duration,
    next_id: Arc<AtomicU64>,
}

impl SnapcastControl {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: crate::env::control_timeout(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ControlError> {
        let endpoint = self.endpoint();
        match tokio::time::timeout(self.timeout, self.exchange(&endpoint, method, params)).await {
            Ok(result) => result,
            Err(_) => Err(ControlError::Timeout {
                endpoint,
                after: self.timeout,
            }),
        }
    }

    async fn exchange(
        &self,
        endpoint: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, ControlError> {
        let unreachable = |e: std::io::Error| ControlError::Unreachable {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut request = json!({ "id": id, "jsonrpc": "2.0", "method": method });
        if !params.is_null() {
            request["params"] = params;
        }
        let mut line = request.to_string();
        line.push('\n');

        let stream = TcpStream::connect(endpoint).await.map_err(unreachable)?;
        let (reader, mut writer) = stream.into_split();
        writer.write_all(line.as_bytes()).await.map_err(unreachable)?;
        writer.flush().await.map_err(unreachable)?;

        let mut reader = BufReader::new(reader);
        let mut buf = String::new();
        loop {
            buf.clear();
            let n = reader.read_line(&mut buf).await.map_err(unreachable)?;
            if n == 0 {
                return Err(ControlError::Protocol(
                    "connection closed before response".to_string(),
                ));
            }
            if buf.len() > MAX_LINE_BYTES {
                return Err(ControlError::Protocol("response too large".to_string()));
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            let message: RpcResponse = serde_json::from_str(trimmed)
                .map_err(|e| ControlError::Protocol(e.to_string()))?;
            if message.id.as_ref().and_then(Value::as_u64) != Some(id) {
                tracing::trace!(endpoint, "skipping control notification");
                continue;
            }
            if let Some(error) = message.error {
                return Err(ControlError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(message.result.unwrap_or(Value::Null));
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct StatusResult {
    server: ServerStatus,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ServerStatus {
    groups: Vec<GroupStatus>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GroupStatus {
    clients: Vec<ClientStatus>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ClientStatus {
    id: String,
    host: HostStatus,
    config: ClientConfig,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct HostStatus {
    name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ClientConfig {
    name: String,
    volume: VolumeStatus,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct VolumeStatus {
    percent: i64,
    muted: bool,
}

impl From<ClientStatus> for ControlClient {
    fn from(client: ClientStatus) -> Self {
        let friendly_name = if client.config.name.trim().is_empty() {
            client.host.name
        } else {
            client.config.name
        };
        ControlClient {
            id: client.id,
            friendly_name,
            volume_percent: bluesnap_core::clamp_volume(client.config.volume.percent),
            muted: client.config.volume.muted,
        }
    }
}

/// Flatten a `Server.GetStatus` result into its clients
pub(crate) fn clients_from_status(result: Value) -> Result<Vec<ControlClient>, ControlError> {
    let status: StatusResult =
        serde_json::from_value(result).map_err(|e| ControlError::Protocol(e.to_string()))?;
    Ok(status
        .server
        .groups
        .into_iter()
        .flat_map(|g| g.clients)
        .filter(|c| !c.id.is_empty())
        .map(ControlClient::from)
        .collect())
}

#[async_trait]
impl ControlAdapter for SnapcastControl {
    async fn list_clients(&self) -> Result<Vec<ControlClient>, ControlError> {
        let result = self.call("Server.GetStatus", Value::Null).await?;
        clients_from_status(result)
    }

    async fn set_volume(
        &self,
        client_id: &str,
        percent: u8,
        muted: bool,
    ) -> Result<(), ControlError> {
        let params = json!({
            "id": client_id,
            "volume": { "percent": percent, "muted": muted },
        });
        self.call("Client.SetVolume", params).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "snapcast_tests.rs"]
mod tests;
