//! Queue lifecycle events
//!
//! Published on a broadcast channel. Sending never blocks; with no subscriber
//! the event is simply dropped, and slow subscribers see `Lagged`.

use crate::item::ItemId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A new item entered the FIFO
    Enqueued {
        queue: String,
        item_id: ItemId,
        key: Option<String>,
    },

    /// A caller attached to an existing item
    Coalesced {
        queue: String,
        item_id: ItemId,
        waiters: usize,
    },

    /// An item took a processing slot
    Started { queue: String, item_id: ItemId },

    Completed {
        queue: String,
        item_id: ItemId,
        duration_ms: u64,
    },

    Failed {
        queue: String,
        item_id: ItemId,
        error: String,
    },

    /// Pending items were rejected by an explicit clear
    Cleared { queue: String, rejected: usize },
}

impl QueueEvent {
    pub fn queue(&self) -> &str {
        match self {
            QueueEvent::Enqueued { queue, .. }
            | QueueEvent::Coalesced { queue, .. }
            | QueueEvent::Started { queue, .. }
            | QueueEvent::Completed { queue, .. }
            | QueueEvent::Failed { queue, .. }
            | QueueEvent::Cleared { queue, .. } => queue,
        }
    }
}
