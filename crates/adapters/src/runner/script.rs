// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stdin-scripted tool runner (bluetoothctl)

use super::{render_script, CommandGroup, CommandRunner, RunnerError};
use crate::subprocess::{run_script_with_timeout, run_with_timeout, SubprocessError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default tool driven by [`ScriptRunner::bluetoothctl`]
pub const BLUETOOTHCTL: &str = "bluetoothctl";

/// Runs a tool by writing a command script to its stdin
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    program: PathBuf,
    quit: String,
}

impl ScriptRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            quit: "quit".to_string(),
        }
    }

    pub fn bluetoothctl() -> Self {
        Self::new(BLUETOOTHCTL)
    }

    /// Override the directive appended after every script
    pub fn with_quit(mut self, quit: impl Into<String>) -> Self {
        self.quit = quit.into();
        self
    }

    /// Resolve the tool on PATH, failing if it is not installed
    pub fn resolve(self) -> Result<Self, RunnerError> {
        let program = which::which(&self.program).map_err(|_| self.not_found())?;
        Ok(Self { program, ..self })
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn tool(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    fn not_found(&self) -> RunnerError {
        RunnerError::NotFound(self.tool())
    }
}

fn runner_error(tool: &str, err: SubprocessError) -> RunnerError {
    match err {
        SubprocessError::NotFound(_) => RunnerError::NotFound(tool.to_string()),
        SubprocessError::TimedOut { timeout, .. } => RunnerError::Timeout {
            tool: tool.to_string(),
            after: timeout,
        },
        SubprocessError::Io { source, .. } => RunnerError::Io {
            tool: tool.to_string(),
            message: source.to_string(),
        },
    }
}

fn check_output(tool: &str, output: Output) -> Result<String, RunnerError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    Err(RunnerError::CommandFailed {
        tool: tool.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[async_trait]
impl CommandRunner for ScriptRunner {
    async fn run(
        &self,
        groups: &[CommandGroup],
        timeout: Duration,
    ) -> Result<String, RunnerError> {
        let tool = self.tool();
        let script = render_script(groups, &self.quit);
        let output = run_script_with_timeout(Command::new(&self.program), &script, timeout, &tool)
            .await
            .map_err(|e| runner_error(&tool, e))?;
        check_output(&tool, output)
    }

    async fn query(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, RunnerError> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        let output = run_with_timeout(cmd, timeout, program)
            .await
            .map_err(|e| runner_error(program, e))?;
        check_output(program, output)
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
