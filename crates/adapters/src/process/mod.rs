// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running child process adapters

mod system;

pub use system::{SystemChild, SystemProcessAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeChild, FakeProcessAdapter};

use async_trait::async_trait;
use bluesnap_core::ProcessTarget;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from process operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("{0} not found on PATH")]
    NotFound(String),
    #[error("failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },
    #[error("failed to signal pid {pid}: {message}")]
    SignalFailed { pid: u32, message: String },
    #[error("failed to wait for child: {0}")]
    Wait(String),
}

/// Handle to one spawned child
#[async_trait]
pub trait ChildProcess: Send + 'static {
    fn id(&self) -> Option<u32>;

    /// Wait for exit and return the exit code.
    ///
    /// Cancel-safe. Death by signal N is reported as `128 + N`.
    async fn wait(&mut self) -> Result<Option<i32>, ProcessError>;

    /// Ask the child to exit (SIGTERM)
    async fn terminate(&mut self) -> Result<(), ProcessError>;

    /// Force the child down (SIGKILL) and reap it
    async fn kill(&mut self) -> Result<(), ProcessError>;
}

/// Adapter for locating and spawning supervised executables
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    type Child: ChildProcess;

    /// Resolve `program` to an executable path
    fn resolve(&self, program: &Path) -> Result<PathBuf, ProcessError>;

    /// Spawn the target with its launch arguments
    async fn spawn(&self, target: &ProcessTarget) -> Result<Self::Child, ProcessError>;
}
