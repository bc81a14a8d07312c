// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the Bluetooth control tool, the stream
//! client process, and the stream server's control endpoint.

pub mod control;
mod env;
pub mod process;
pub mod runner;
pub mod subprocess;
pub mod traced;

pub use control::{ControlAdapter, ControlClient, ControlError, SnapcastControl};
pub use process::{ChildProcess, ProcessAdapter, ProcessError, SystemChild, SystemProcessAdapter};
pub use runner::{
    parse_bd_address, parse_devices, CommandGroup, CommandRunner, KnownDevice, LinkStatus,
    RunnerError, ScriptRunner,
};
pub use traced::{TracedControl, TracedProcess, TracedRunner};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use control::{ControlCall, FakeControlAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeChild, FakeProcessAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeCommandRunner, RunnerCall};
