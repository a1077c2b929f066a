use crate::table::types::RoundResult;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Round-level notifications for presentation collaborators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    /// Input lock toggled; `true` blocks spot clicks and chip selection
    LockStateChanged { locked: bool },
    /// A round resolved
    RoundResolved { result: RoundResult },
    /// The wallet could not apply a resolved round; the result stands
    SettlementFailed { round: u64, reason: String },
}

/// Fan-out of table events. Publishing with no subscribers is fine.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TableEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: TableEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
