// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Link connectivity observers

use async_trait::async_trait;
use bluesnap_core::{LinkEvent, LinkTarget};
use tokio::sync::mpsc;

/// Receives connect/disconnect transitions from the link supervisor.
///
/// Called from the watchdog task; implementations must not call back into
/// `LinkSupervisor::stop`, which awaits that task.
#[async_trait]
pub trait LinkObserver: Clone + Send + Sync + 'static {
    async fn on_connected(&self, target: &LinkTarget);

    async fn on_disconnected(&self, target: &LinkTarget);
}

/// Observer that ignores every transition
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpObserver;

#[async_trait]
impl LinkObserver for NoOpObserver {
    async fn on_connected(&self, _target: &LinkTarget) {}

    async fn on_disconnected(&self, _target: &LinkTarget) {}
}

/// Forwards transitions as [`LinkEvent`]s; drops events when the channel
/// is full rather than stalling the watchdog.
#[derive(Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<LinkEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<LinkEvent>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: LinkEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "dropping link event");
        }
    }
}

#[async_trait]
impl LinkObserver for ChannelObserver {
    async fn on_connected(&self, target: &LinkTarget) {
        self.forward(LinkEvent::connected(target));
    }

    async fn on_disconnected(&self, target: &LinkTarget) {
        self.forward(LinkEvent::disconnected(target));
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every transition for assertions
    #[derive(Clone, Default)]
    pub struct FakeObserver {
        events: Arc<Mutex<Vec<LinkEvent>>>,
    }

    impl FakeObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<LinkEvent> {
            self.events.lock().clone()
        }

        pub fn connected_count(&self) -> usize {
            self.events
                .lock()
                .iter()
                .filter(|e| matches!(e, LinkEvent::Connected { .. }))
                .count()
        }

        pub fn disconnected_count(&self) -> usize {
            self.events
                .lock()
                .iter()
                .filter(|e| matches!(e, LinkEvent::Disconnected { .. }))
                .count()
        }
    }

    #[async_trait]
    impl LinkObserver for FakeObserver {
        async fn on_connected(&self, target: &LinkTarget) {
            self.events.lock().push(LinkEvent::connected(target));
        }

        async fn on_disconnected(&self, target: &LinkTarget) {
            self.events.lock().push(LinkEvent::disconnected(target));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeObserver;

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
