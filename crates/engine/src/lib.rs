// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Bluesnap supervision engine: keeps the speaker link and the stream
//! client alive, and routes control-plane commands to them.

mod bridge;
mod control_session;
pub mod env;
mod error;
mod link;
mod observer;
mod process;
mod telemetry;

#[cfg(test)]
mod test_helpers;

pub use bridge::{Bridge, CommandOutcome};
pub use control_session::{select_client, ControlOutcome, ControlSession};
pub use error::{DispatchError, SupervisorError};
pub use link::{LinkConfig, LinkSupervisor, MIN_WATCHDOG_PERIOD};
pub use observer::{ChannelObserver, LinkObserver, NoOpObserver};
pub use process::{
    ProcessConfig, ProcessSupervisor, StopOutcome, RESTART_BACKOFF, STOP_TIMEOUT,
};
pub use telemetry::{
    SnapshotSource, TelemetryError, TelemetryPublisher, TelemetrySink, MIN_TELEMETRY_INTERVAL,
};

#[cfg(any(test, feature = "test-support"))]
pub use observer::FakeObserver;
