// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External command runner for line-oriented control tools

mod parse;
mod script;

pub use parse::{parse_bd_address, parse_devices, KnownDevice, LinkStatus};
pub use script::ScriptRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCommandRunner, RunnerCall};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// One line of a tool script: a verb followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    pub verb: String,
    pub args: Vec<String>,
}

impl CommandGroup {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.verb.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())
    }
}

/// Render groups as a newline-terminated script ending with `quit`
pub fn render_script(groups: &[CommandGroup], quit: &str) -> String {
    let mut script = String::new();
    for group in groups {
        script.push_str(&group.line());
        script.push('\n');
    }
    script.push_str(quit);
    script.push('\n');
    script
}

/// Errors from running an external tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("{0} not found on PATH")]
    NotFound(String),
    #[error("{tool} exited with code {code:?}: {stderr}")]
    CommandFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{tool} timed out after {}s", .after.as_secs())]
    Timeout { tool: String, after: Duration },
    #[error("{tool}: {message}")]
    Io { tool: String, message: String },
}

impl RunnerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunnerError::Timeout { .. })
    }
}

/// Runs a fixed control tool with a script of command groups.
///
/// No retries happen at this layer.
#[async_trait]
pub trait CommandRunner: Clone + Send + Sync + 'static {
    /// Launch the tool once, feed every group followed by the quit
    /// directive, and return stdout on exit code 0.
    async fn run(&self, groups: &[CommandGroup], timeout: Duration)
        -> Result<String, RunnerError>;

    /// Run a one-shot helper tool with plain arguments and return stdout.
    async fn query(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, RunnerError>;
}
