//! Queue errors
//!
//! One settlement is fanned out to every coalesced waiter, so the error has to
//! be cloneable. It converts into the crate-wide error at the boundary.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The processor returned an error or panicked
    #[error("processing failed: {0}")]
    Processing(String),

    /// The item was still pending when the queue was cleared
    #[error("queue '{0}' was cleared while the item was pending")]
    Cleared(String),

    /// The queue dropped the item without settling it
    #[error("queue '{0}' dropped the item before it settled")]
    Abandoned(String),
}

impl QueueError {
    pub fn is_cleared(&self) -> bool {
        matches!(self, QueueError::Cleared(_))
    }
}

impl From<QueueError> for coalesce_foundation::Error {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Processing(msg) => coalesce_foundation::Error::Processing(msg),
            QueueError::Cleared(name) => coalesce_foundation::Error::Cleared(name),
            QueueError::Abandoned(name) => {
                coalesce_foundation::Error::Internal(format!("queue '{}' abandoned an item", name))
            }
        }
    }
}
