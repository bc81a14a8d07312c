// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChildProcess, ProcessAdapter, ProcessError};
use async_trait::async_trait;
use bluesnap_core::ProcessTarget;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// Exit code reported after a honoured terminate (128 + SIGTERM)
pub const TERMINATED_CODE: i32 = 143;
/// Exit code reported after a kill (128 + SIGKILL)
pub const KILLED_CODE: i32 = 137;

struct ChildSlot {
    pid: u32,
    exit: watch::Sender<Option<Option<i32>>>,
}

impl ChildSlot {
    fn exited(&self) -> bool {
        self.exit.borrow().is_some()
    }

    fn finish(&self, code: Option<i32>) {
        self.exit.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(code);
            true
        });
    }
}

#[derive(Default)]
struct FakeProcessState {
    spawns: Vec<ProcessTarget>,
    children: Vec<Arc<ChildSlot>>,
    missing: HashSet<String>,
    failing_spawns: usize,
    ignore_terminate: bool,
    terminations: usize,
    kills: usize,
    next_pid: u32,
}

/// Fake process adapter whose children exit only when told to
#[derive(Clone, Default)]
pub struct FakeProcessAdapter {
    inner: Arc<Mutex<FakeProcessState>>,
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `resolve` fail for programs with this file name
    pub fn set_missing(&self, program: &str) {
        self.inner.lock().missing.insert(program.to_string());
    }

    /// Fail the next `count` spawns
    pub fn fail_next_spawns(&self, count: usize) {
        self.inner.lock().failing_spawns = count;
    }

    /// Keep children alive through `terminate`, so only `kill` stops them
    pub fn set_ignore_terminate(&self, ignore: bool) {
        self.inner.lock().ignore_terminate = ignore;
    }

    /// Exit the most recently spawned child with `code`
    pub fn exit_current(&self, code: Option<i32>) {
        if let Some(slot) = self.inner.lock().children.last() {
            slot.finish(code);
        }
    }

    pub fn spawns(&self) -> Vec<ProcessTarget> {
        self.inner.lock().spawns.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.inner.lock().spawns.len()
    }

    /// Children that have not exited yet
    pub fn live_count(&self) -> usize {
        self.inner.lock().children.iter().filter(|c| !c.exited()).count()
    }

    pub fn current_pid(&self) -> Option<u32> {
        self.inner.lock().children.last().map(|c| c.pid)
    }

    pub fn terminate_count(&self) -> usize {
        self.inner.lock().terminations
    }

    pub fn kill_count(&self) -> usize {
        self.inner.lock().kills
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    type Child = FakeChild;

    fn resolve(&self, program: &Path) -> Result<PathBuf, ProcessError> {
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.inner.lock().missing.contains(&name) {
            return Err(ProcessError::NotFound(name));
        }
        Ok(Path::new("/usr/bin").join(program))
    }

    async fn spawn(&self, target: &ProcessTarget) -> Result<FakeChild, ProcessError> {
        let mut inner = self.inner.lock();
        if inner.failing_spawns > 0 {
            inner.failing_spawns -= 1;
            return Err(ProcessError::SpawnFailed {
                program: target.program.display().to_string(),
                message: "injected spawn failure".to_string(),
            });
        }
        inner.next_pid += 1;
        let pid = 1000 + inner.next_pid;
        let (tx, rx) = watch::channel(None);
        let slot = Arc::new(ChildSlot { pid, exit: tx });
        inner.spawns.push(target.clone());
        inner.children.push(Arc::clone(&slot));
        Ok(FakeChild {
            slot,
            exit: rx,
            adapter: Arc::clone(&self.inner),
        })
    }
}

/// Child handle produced by [`FakeProcessAdapter`]
pub struct FakeChild {
    slot: Arc<ChildSlot>,
    exit: watch::Receiver<Option<Option<i32>>>,
    adapter: Arc<Mutex<FakeProcessState>>,
}

#[async_trait]
impl ChildProcess for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(self.slot.pid)
    }

    async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
        loop {
            let current = *self.exit.borrow_and_update();
            if let Some(code) = current {
                return Ok(code);
            }
            if self.exit.changed().await.is_err() {
                return Err(ProcessError::Wait("child handle dropped".to_string()));
            }
        }
    }

    async fn terminate(&mut self) -> Result<(), ProcessError> {
        let ignore = {
            let mut adapter = self.adapter.lock();
            adapter.terminations += 1;
            adapter.ignore_terminate
        };
        if !ignore {
            self.slot.finish(Some(TERMINATED_CODE));
        }
        Ok(())
    }

    async fn kill(&mut self) -> Result<(), ProcessError> {
        self.adapter.lock().kills += 1;
        self.slot.finish(Some(KILLED_CODE));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
