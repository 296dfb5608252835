//! Per-viewer deduplication of the "just became ready" cue.

use crate::types::DbId;

/// Tracks the last announced ready order for one viewer.
///
/// Lives inside a single viewer connection and is never shared.
#[derive(Debug, Clone, Default)]
pub struct HighlightTracker {
    last_announced_id: Option<DbId>,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_announced_id(&self) -> Option<DbId> {
        self.last_announced_id
    }

    /// Evaluate freshly fetched state and return whether the cue fires.
    ///
    /// Fires iff a most recently ready order exists, differs from the last
    /// announced one, and something had been announced before. The first
    /// observation after connecting therefore never fires.
    pub fn observe(&mut self, latest_ready: Option<DbId>) -> bool {
        let fire = match (latest_ready, self.last_announced_id) {
            (Some(current), Some(previous)) => current != previous,
            _ => false,
        };
        self.last_announced_id = latest_ready;
        fire
    }
}
