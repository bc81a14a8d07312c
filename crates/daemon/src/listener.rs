// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and
//! answering each request against the bridge without blocking the
//! supervisors.

use std::sync::Arc;
use std::time::Duration;

use bluesnap_adapters::{CommandRunner, ControlAdapter, ProcessAdapter};
use bluesnap_core::Clock;
use bluesnap_engine::{Bridge, LinkObserver};
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::protocol::{self, Request, Response, PROTOCOL_VERSION};

/// Listener task for accepting socket connections.
pub struct Listener<R, O, P, K, C> {
    socket: UnixListener,
    bridge: Arc<Bridge<R, O, P, K, C>>,
    shutdown: Arc<Notify>,
    timeout: Duration,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl<R, O, P, K, C> Listener<R, O, P, K, C>
where
    R: CommandRunner,
    O: LinkObserver,
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    pub fn new(
        socket: UnixListener,
        bridge: Arc<Bridge<R, O, P, K, C>>,
        shutdown: Arc<Notify>,
        timeout: Duration,
    ) -> Self {
        Self {
            socket,
            bridge,
            shutdown,
            timeout,
        }
    }

    /// Run the listener loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let bridge = Arc::clone(&self.bridge);
                    let shutdown = Arc::clone(&self.shutdown);
                    let timeout = self.timeout;

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &bridge, &shutdown, timeout).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection<R, O, P, K, C>(
    stream: UnixStream,
    bridge: &Bridge<R, O, P, K, C>,
    shutdown: &Notify,
    timeout: Duration,
) -> Result<(), ConnectionError>
where
    R: CommandRunner,
    O: LinkObserver,
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, timeout).await?;

    // Status is polled; everything else is an operator action
    if matches!(request, Request::Status | Request::Ping) {
        debug!(request = ?request, "received request");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, bridge, shutdown).await;
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, timeout).await?;
    Ok(())
}

/// Handle a single request and return a response.
pub(crate) async fn handle_request<R, O, P, K, C>(
    request: Request,
    bridge: &Bridge<R, O, P, K, C>,
    shutdown: &Notify,
) -> Response
where
    R: CommandRunner,
    O: LinkObserver,
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Status => Response::Status {
            snapshot: Box::new(bridge.snapshot().await),
        },

        Request::Command { kind, payload } => match bridge.dispatch_raw(&kind, &payload).await {
            Ok(outcome) => {
                info!(%outcome, "command applied");
                Response::CommandApplied { outcome }
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "command rejected");
                Response::Error {
                    message: e.to_string(),
                }
            }
        },

        Request::Devices => match bridge.known_devices().await {
            Ok(devices) => Response::Devices { devices },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Request::Shutdown => {
            shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
