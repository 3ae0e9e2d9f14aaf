//! Background sync.

use serde::{Deserialize, Serialize};

/// Tag the page registers for deferred actions.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// An action recorded while offline, replayed on sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: String,
    pub url: String,
}

/// Store of actions waiting for connectivity.
///
/// The site never records offline actions, so the queue is always empty and
/// a sync completes without doing any work.
#[derive(Debug, Default, Clone, Copy)]
pub struct PendingActions;

impl PendingActions {
    /// Create the queue.
    pub fn new() -> Self {
        Self
    }

    /// Actions queued under `tag`.
    pub fn for_tag(&self, _tag: &str) -> Vec<PendingAction> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_empty() {
        assert!(PendingActions::new().for_tag(BACKGROUND_SYNC_TAG).is_empty());
        assert!(PendingActions::new().for_tag("other").is_empty());
    }
}
