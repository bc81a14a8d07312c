// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status and command façade over both supervisors.
//!
//! Raw control-plane commands are parsed here once into [`Command`] and
//! routed; every failure comes back as a [`DispatchError`].

use crate::control_session::ControlOutcome;
use crate::error::{DispatchError, SupervisorError};
use crate::link::LinkSupervisor;
use crate::observer::LinkObserver;
use crate::process::{ProcessSupervisor, StopOutcome};
use crate::telemetry::SnapshotSource;
use async_trait::async_trait;
use bluesnap_adapters::{CommandRunner, ControlAdapter, KnownDevice, ProcessAdapter};
use bluesnap_core::{Clock, Command, IdentitySnapshot, LinkTarget, MacAddress, StatusSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an applied command did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Volume {
        client_id: String,
        volume: u8,
        muted: bool,
    },
    Mute {
        client_id: String,
        volume: u8,
        muted: bool,
    },
    Reconnected {
        speaker: String,
        connected: bool,
    },
    Switched {
        speaker: String,
        mac: MacAddress,
    },
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Volume { volume, client_id, .. } => {
                write!(f, "volume set to {}% ({})", volume, client_id)
            }
            CommandOutcome::Mute { muted: true, client_id, .. } => write!(f, "muted ({})", client_id),
            CommandOutcome::Mute { muted: false, client_id, .. } => write!(f, "unmuted ({})", client_id),
            CommandOutcome::Reconnected { speaker, connected: true } => {
                write!(f, "reconnected to {}", speaker)
            }
            CommandOutcome::Reconnected { speaker, connected: false } => {
                write!(f, "restarted link to {} (not yet connected)", speaker)
            }
            CommandOutcome::Switched { speaker, mac } => write!(f, "switched to {} ({})", speaker, mac),
        }
    }
}

/// Owns both supervisors and answers the control plane
pub struct Bridge<R, O, P, K, C> {
    identity: IdentitySnapshot,
    link: LinkSupervisor<R, O, C>,
    process: ProcessSupervisor<P, K, C>,
    /// Targets a switch may select, besides the active one
    speakers: Vec<LinkTarget>,
    clock: C,
}

impl<R, O, P, K, C> Bridge<R, O, P, K, C>
where
    R: CommandRunner,
    O: LinkObserver,
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    pub fn new(
        identity: IdentitySnapshot,
        link: LinkSupervisor<R, O, C>,
        process: ProcessSupervisor<P, K, C>,
        speakers: Vec<LinkTarget>,
        clock: C,
    ) -> Self {
        Self {
            identity,
            link,
            process,
            speakers,
            clock,
        }
    }

    /// Start the link, then the stream client.
    ///
    /// If the stream client fails to start the link is stopped again.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        self.link.start().await?;
        if let Err(e) = self.process.start().await {
            self.link.stop().await;
            return Err(e);
        }
        Ok(())
    }

    /// Stop the stream client, then the link
    pub async fn shutdown(&self) {
        if self.process.stop().await == StopOutcome::TimedOut {
            tracing::warn!("stream client had to be killed during shutdown");
        }
        self.link.stop().await;
    }

    pub fn link(&self) -> &LinkSupervisor<R, O, C> {
        &self.link
    }

    pub fn process(&self) -> &ProcessSupervisor<P, K, C> {
        &self.process
    }

    /// Current state of both resources, with cached volume levels
    pub async fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            taken_at_ms: self.clock.epoch_ms(),
            identity: self.identity.clone(),
            bluetooth: self.link.snapshot(),
            snapcast: self.process.snapshot().await,
        }
    }

    /// Like [`snapshot`](Self::snapshot), re-reading volume levels first
    pub async fn refresh_snapshot(&self) -> StatusSnapshot {
        self.process.refresh_control().await;
        self.snapshot().await
    }

    pub async fn known_devices(&self) -> Result<Vec<KnownDevice>, DispatchError> {
        Ok(self.link.known_devices().await?)
    }

    /// Parse a raw `(kind, payload)` pair and dispatch it
    pub async fn dispatch_raw(&self, kind: &str, payload: &str) -> Result<CommandOutcome, DispatchError> {
        let command = Command::parse(kind, payload).map_err(|e| {
            tracing::warn!(kind, error = %e, "rejected command");
            e
        })?;
        self.dispatch(command).await
    }

    pub async fn dispatch(&self, command: Command) -> Result<CommandOutcome, DispatchError> {
        tracing::info!(%command, "dispatching command");
        match command {
            Command::Volume(volume) => {
                let (client_id, volume, muted) =
                    applied(self.process.set_volume(i64::from(volume)).await)?;
                Ok(CommandOutcome::Volume {
                    client_id,
                    volume,
                    muted,
                })
            }
            Command::Mute(mute) => {
                let (client_id, volume, muted) = applied(self.process.set_mute(mute).await)?;
                Ok(CommandOutcome::Mute {
                    client_id,
                    volume,
                    muted,
                })
            }
            Command::Reconnect => {
                self.link.stop().await;
                self.link.start().await?;
                Ok(CommandOutcome::Reconnected {
                    speaker: self.link.target().name,
                    connected: self.link.is_connected(),
                })
            }
            Command::SwitchTarget(name) => {
                let Some(target) = self.approved_target(&name) else {
                    return Err(DispatchError::UnknownTarget(name));
                };
                self.link.switch_target(target.clone()).await?;
                Ok(CommandOutcome::Switched {
                    speaker: target.name,
                    mac: target.address,
                })
            }
        }
    }

    /// Active or configured speaker matching `name` or its address
    fn approved_target(&self, name: &str) -> Option<LinkTarget> {
        let current = self.link.target();
        let name = name.trim();
        std::iter::once(&current)
            .chain(self.speakers.iter())
            .find(|t| t.name.eq_ignore_ascii_case(name) || t.address.matches(name))
            .cloned()
    }
}

fn applied(outcome: ControlOutcome) -> Result<(String, u8, bool), DispatchError> {
    match outcome {
        ControlOutcome::Applied {
            client_id,
            volume,
            muted,
        } => Ok((client_id, volume, muted)),
        ControlOutcome::Unavailable { reason } => Err(DispatchError::ControlUnavailable(reason)),
    }
}

#[async_trait]
impl<R, O, P, K, C> SnapshotSource for Bridge<R, O, P, K, C>
where
    R: CommandRunner,
    O: LinkObserver,
    P: ProcessAdapter,
    K: ControlAdapter,
    C: Clock,
{
    async fn telemetry_snapshot(&self) -> StatusSnapshot {
        self.refresh_snapshot().await
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
