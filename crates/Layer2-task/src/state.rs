//! Queue item state machine
//!
//! `Pending -> Processing -> Completed | Failed`

use serde::{Deserialize, Serialize};

/// Possible states of a queue item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    /// Waiting in the FIFO for a free slot
    Pending,

    /// Processor is running
    Processing,

    /// Processor returned a value
    Completed,

    /// Processor returned an error or panicked
    Failed,
}

impl ItemState {
    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Completed | ItemState::Failed)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ItemState::Pending)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ItemState::Processing)
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemState::Pending => "pending",
            ItemState::Processing => "processing",
            ItemState::Completed => "completed",
            ItemState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
