//! Decides what one poll cycle means for viewers and for the idle detector.

use crate::order::OrderRecord;
use crate::types::Timestamp;

/// Result of one poll cycle's store query.
#[derive(Debug, Clone, Copy)]
pub enum PollOutcome<'a> {
    /// The query succeeded; the slice may be empty.
    Fetched(&'a [OrderRecord]),
    /// The query failed; nothing is known about this cycle.
    Failed,
}

/// What the idle detector should be told about a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleSignal {
    /// At least one order changed; `latest` is the newest change timestamp.
    Activity { latest: Timestamp },
    /// The store answered and nothing changed.
    Quiet,
    /// The store did not answer. Must not be read as silence.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether a single `update` signal goes out for this cycle.
    pub publish_update: bool,
    pub idle_signal: IdleSignal,
}

/// Classify a poll outcome.
///
/// A non-empty batch yields exactly one update regardless of its size.
pub fn classify(outcome: PollOutcome<'_>) -> Classification {
    match outcome {
        PollOutcome::Fetched(records) => {
            match records.iter().map(OrderRecord::last_changed_at).max() {
                Some(latest) => Classification {
                    publish_update: true,
                    idle_signal: IdleSignal::Activity { latest },
                },
                None => Classification {
                    publish_update: false,
                    idle_signal: IdleSignal::Quiet,
                },
            }
        }
        PollOutcome::Failed => Classification {
            publish_update: false,
            idle_signal: IdleSignal::Unknown,
        },
    }
}
