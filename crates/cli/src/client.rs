// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bluesnap_adapters::KnownDevice;
use bluesnap_core::StatusSnapshot;
use bluesnap_daemon::protocol::{self, ProtocolError};
use bluesnap_daemon::{Request, Response};
use bluesnap_engine::CommandOutcome;
use thiserror::Error;
use tokio::net::UnixStream;

use crate::env;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
    /// Response wait for requests that drive external tools
    command_timeout: Duration,
}

impl DaemonClient {
    /// Connect to the running daemon (never starts one)
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = env::state_dir()?.join("daemon.sock");
        Ok(Self::at(socket_path, env::timeout_ipc())?.with_command_timeout(env::timeout_command()))
    }

    /// Client for an explicit socket path
    pub fn at(socket_path: impl Into<PathBuf>, timeout: Duration) -> Result<Self, ClientError> {
        let socket_path = socket_path.into();
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self {
            socket_path,
            timeout,
            command_timeout: timeout,
        })
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            // A socket file nobody listens on is left by a crashed daemon
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) => {
                return Err(ClientError::DaemonNotRunning)
            }
            Err(e) => return Err(e.into()),
        };
        let (mut reader, mut writer) = stream.into_split();

        protocol::write_request(&mut writer, request, self.timeout).await?;
        let wait = if request.waits_on_tools() {
            self.command_timeout.max(self.timeout)
        } else {
            self.timeout
        };
        let response = protocol::read_response(&mut reader, wait).await?;
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Ok(other),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Daemon protocol version
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: bluesnap_daemon::PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn status(&self) -> Result<StatusSnapshot, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { snapshot } => Ok(*snapshot),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Forward a command; the daemon does all parsing and validation
    pub async fn command(&self, kind: &str, payload: &str) -> Result<CommandOutcome, ClientError> {
        let request = Request::Command {
            kind: kind.to_string(),
            payload: payload.to_string(),
        };
        match self.send(&request).await? {
            Response::CommandApplied { outcome } => Ok(outcome),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn devices(&self) -> Result<Vec<KnownDevice>, ClientError> {
        match self.send(&Request::Devices).await? {
            Response::Devices { devices } => Ok(devices),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
