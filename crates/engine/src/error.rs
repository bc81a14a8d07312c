// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the supervisors and the command façade

use bluesnap_adapters::{ProcessError, RunnerError};
use bluesnap_core::CommandParseError;
use thiserror::Error;

/// Errors raised by supervisor lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupervisorError {
    /// A required executable is missing; never retried
    #[error("required executable not found: {0}")]
    ResourceNotFound(String),
    #[error(transparent)]
    Runner(RunnerError),
    #[error(transparent)]
    Process(ProcessError),
}

impl From<RunnerError> for SupervisorError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::NotFound(tool) => SupervisorError::ResourceNotFound(tool),
            other => SupervisorError::Runner(other),
        }
    }
}

impl From<ProcessError> for SupervisorError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NotFound(program) => SupervisorError::ResourceNotFound(program),
            other => SupervisorError::Process(other),
        }
    }
}

/// Errors reported back to the control plane for a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidPayload(#[from] CommandParseError),
    #[error("speaker '{0}' is not an approved target")]
    UnknownTarget(String),
    #[error("volume control unavailable: {0}")]
    ControlUnavailable(String),
    #[error("link command failed: {0}")]
    Link(#[from] SupervisorError),
}
