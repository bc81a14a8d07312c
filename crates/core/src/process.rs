// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch specification and mutable state for the supervised stream client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Audio output backend the stream client plays through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackend {
    Alsa,
    Pulse,
    Pipewire,
    #[default]
    Bluealsa,
}

impl AudioBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioBackend::Alsa => "alsa",
            AudioBackend::Pulse => "pulse",
            AudioBackend::Pipewire => "pipewire",
            AudioBackend::Bluealsa => "bluealsa",
        }
    }
}

/// Resolved settings the launch argument list is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub host: String,
    pub port: u16,
    pub latency_ms: u32,
    pub buffer_ms: u32,
    pub display_name: String,
    pub audio_backend: AudioBackend,
    pub audio_device: Option<String>,
    pub stream: Option<String>,
}

impl LaunchOptions {
    /// Explicit device wins; otherwise the backend name doubles as the card.
    pub fn sound_card(&self) -> Option<String> {
        match &self.audio_device {
            Some(device) if !device.trim().is_empty() => Some(device.clone()),
            _ => Some(self.audio_backend.as_str().to_string()),
        }
    }

    /// Ordered argument list (without the program itself)
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--host".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
            "--latency".to_string(),
            self.latency_ms.to_string(),
            "--buffer".to_string(),
            self.buffer_ms.to_string(),
            "--name".to_string(),
            self.display_name.clone(),
        ];
        if let Some(card) = self.sound_card() {
            args.push("--soundcard".to_string());
            args.push(card);
        }
        if let Some(stream) = self.stream.as_ref().filter(|s| !s.trim().is_empty()) {
            args.push("--stream".to_string());
            args.push(stream.clone());
        }
        args
    }
}

/// Executable plus argument list, built once when the supervisor is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTarget {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Name the client announces itself with; used to find it on the control endpoint
    pub display_name: String,
}

impl ProcessTarget {
    pub fn new(program: impl Into<PathBuf>, options: &LaunchOptions) -> Self {
        Self {
            program: program.into(),
            args: options.to_args(),
            display_name: options.display_name.clone(),
        }
    }

    /// Command line for logging
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Lifecycle phase of the process supervisor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPhase {
    #[default]
    Stopped,
    Starting,
    Running,
    ExitedPendingRestart,
    Restarting,
}

impl fmt::Display for ProcessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessPhase::Stopped => "stopped",
            ProcessPhase::Starting => "starting",
            ProcessPhase::Running => "running",
            ProcessPhase::ExitedPendingRestart => "exited",
            ProcessPhase::Restarting => "restarting",
        };
        f.write_str(s)
    }
}

/// Mutable process state, owned by the process supervisor.
///
/// `restart_count` counts successful spawns, the first one included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessState {
    pub phase: ProcessPhase,
    pub running: bool,
    pub pid: Option<u32>,
    pub last_start_ms: Option<u64>,
    pub last_exit_ms: Option<u64>,
    pub last_exit_code: Option<i32>,
    pub restart_count: u32,
}

impl ProcessState {
    pub fn record_spawn(&mut self, pid: Option<u32>, at_ms: u64) {
        self.phase = ProcessPhase::Running;
        self.running = true;
        self.pid = pid;
        self.last_start_ms = Some(at_ms);
        self.restart_count += 1;
    }

    pub fn record_exit(&mut self, exit_code: Option<i32>, at_ms: u64) {
        self.phase = ProcessPhase::ExitedPendingRestart;
        self.running = false;
        self.pid = None;
        self.last_exit_ms = Some(at_ms);
        self.last_exit_code = exit_code;
    }

    /// Exit code 0 is clean; non-zero or signal termination is abnormal
    pub fn last_exit_was_clean(&self) -> bool {
        self.last_exit_code == Some(0)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
