// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake command runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CommandGroup, CommandRunner, RunnerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Recorded runner call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    Script {
        groups: Vec<CommandGroup>,
        timeout: Duration,
    },
    Query {
        program: String,
        args: Vec<String>,
    },
}

impl RunnerCall {
    /// The verb a reply is keyed on: the first non-`select` verb of a script
    pub fn key(&self) -> String {
        match self {
            RunnerCall::Script { groups, .. } => script_key(groups),
            RunnerCall::Query { program, .. } => program.clone(),
        }
    }
}

fn script_key(groups: &[CommandGroup]) -> String {
    groups
        .iter()
        .find(|g| g.verb != "select")
        .or_else(|| groups.first())
        .map(|g| g.verb.clone())
        .unwrap_or_default()
}

type Reply = Result<String, RunnerError>;

#[derive(Default)]
struct FakeRunnerState {
    calls: Vec<RunnerCall>,
    queued: HashMap<String, VecDeque<Reply>>,
    defaults: HashMap<String, Reply>,
}

/// Fake command runner with per-verb scripted replies.
///
/// Unconfigured verbs succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeCommandRunner {
    inner: Arc<Mutex<FakeRunnerState>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every future call keyed on `verb`
    pub fn set_reply(&self, verb: &str, reply: Reply) {
        self.inner.lock().defaults.insert(verb.to_string(), reply);
    }

    /// Reply once to the next call keyed on `verb`, ahead of the default
    pub fn push_reply(&self, verb: &str, reply: Reply) {
        self.inner
            .lock()
            .queued
            .entry(verb.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Make `info` report the given connectivity
    pub fn set_connected(&self, connected: bool) {
        self.set_reply("info", Ok(info_output(connected)));
    }

    /// Make the next `info` report the given connectivity
    pub fn push_connected(&self, connected: bool) {
        self.push_reply("info", Ok(info_output(connected)));
    }

    pub fn fail(code: i32, stderr: &str) -> Reply {
        Err(RunnerError::CommandFailed {
            tool: "bluetoothctl".to_string(),
            code: Some(code),
            stderr: stderr.to_string(),
        })
    }

    pub fn timeout() -> Reply {
        Err(RunnerError::Timeout {
            tool: "bluetoothctl".to_string(),
            after: Duration::from_secs(30),
        })
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.inner.lock().calls.clone()
    }

    /// Reply keys of every recorded call, in order
    pub fn verbs(&self) -> Vec<String> {
        self.inner.lock().calls.iter().map(RunnerCall::key).collect()
    }

    pub fn count(&self, verb: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.key() == verb)
            .count()
    }

    /// Scripts (as rendered lines) of every call keyed on `verb`
    pub fn scripts_for(&self, verb: &str) -> Vec<Vec<String>> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RunnerCall::Script { groups, .. } if script_key(groups) == verb => {
                    Some(groups.iter().map(CommandGroup::line).collect())
                }
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    fn reply(&self, call: RunnerCall) -> Reply {
        let key = call.key();
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if let Some(reply) = inner.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return reply;
        }
        inner
            .defaults
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

fn info_output(connected: bool) -> String {
    format!(
        "Device AA:BB:CC:DD:EE:FF (public)\n\tPaired: yes\n\tConnected: {}\n",
        if connected { "yes" } else { "no" }
    )
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn run(&self, groups: &[CommandGroup], timeout: Duration) -> Reply {
        self.reply(RunnerCall::Script {
            groups: groups.to_vec(),
            timeout,
        })
    }

    async fn query(&self, program: &str, args: &[String], _timeout: Duration) -> Reply {
        self.reply(RunnerCall::Query {
            program: program.to_string(),
            args: args.to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
