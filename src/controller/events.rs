//! Run notifications.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::scheduler::{RunMetrics, StrategyKind};

/// Lifecycle event of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        run_id: Uuid,
        strategy: StrategyKind,
    },
    Completed {
        run_id: Uuid,
        metrics: RunMetrics,
    },
    Failed {
        run_id: Uuid,
        error: String,
    },
    Cancelled {
        run_id: Uuid,
    },
}

impl RunEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            RunEvent::Started { run_id, .. }
            | RunEvent::Completed { run_id, .. }
            | RunEvent::Failed { run_id, .. }
            | RunEvent::Cancelled { run_id } => *run_id,
        }
    }
}

/// Receives run events. Must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: RunEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNotifications;

impl NotificationSink for NoNotifications {
    fn notify(&self, _event: RunEvent) {}
}

/// Fans events out over a `tokio` broadcast channel.
///
/// Fire-and-forget: with no subscribers the event is dropped, and slow
/// subscribers lag rather than block the run.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<RunEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationSink for BroadcastNotifier {
    fn notify(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}
