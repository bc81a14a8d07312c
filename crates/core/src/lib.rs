// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bluesnap-core: domain types for the Bluesnap speaker bridge

pub mod clock;
pub mod command;
pub mod event;
pub mod link;
pub mod mac;
pub mod process;
pub mod snapshot;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{clamp_volume, Command, CommandParseError, VOLUME_MAX, VOLUME_MIN};
pub use event::LinkEvent;
pub use link::{LinkPhase, LinkState, LinkTarget};
pub use mac::{MacAddress, MacAddressError};
pub use process::{AudioBackend, LaunchOptions, ProcessPhase, ProcessState, ProcessTarget};
pub use snapshot::{IdentitySnapshot, LinkSnapshot, ProcessSnapshot, StatusSnapshot};
pub use time_fmt::{format_elapsed, format_elapsed_ms, format_since};
