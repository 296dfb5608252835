//! Inactivity detection for the board display.
//!
//! Two states: `Active` (recent change seen) and `ResetSent` (threshold
//! exceeded and a reset already broadcast). A reset fires at most once per
//! uninterrupted idle episode.

use chrono::Duration;

use crate::classifier::IdleSignal;
use crate::types::Timestamp;

/// Recommended idle threshold: 3 hours.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::hours(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    ResetSent,
}

/// Transition reported by [`IdleDetector::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTransition {
    /// The threshold was just crossed; broadcast a reset now.
    ResetDue,
    /// Activity ended an idle episode in which a reset had been sent.
    Resumed,
}

#[derive(Debug, Clone)]
pub struct IdleDetector {
    last_change_at: Timestamp,
    reset_fired: bool,
    threshold: Duration,
}

impl IdleDetector {
    /// Start in `Active` with `last_change_at = start`.
    pub fn new(start: Timestamp, threshold: Duration) -> Self {
        Self {
            last_change_at: start,
            reset_fired: false,
            threshold,
        }
    }

    pub fn state(&self) -> IdleState {
        if self.reset_fired {
            IdleState::ResetSent
        } else {
            IdleState::Active
        }
    }

    pub fn last_change_at(&self) -> Timestamp {
        self.last_change_at
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Feed one cycle's signal observed at `now`.
    pub fn observe(&mut self, signal: IdleSignal, now: Timestamp) -> Option<IdleTransition> {
        match signal {
            IdleSignal::Activity { latest } => {
                // Re-observed rows may carry older timestamps, and store
                // clocks may run ahead of ours.
                let at = latest.min(now).max(self.last_change_at);
                self.last_change_at = at;
                let was_reset = std::mem::replace(&mut self.reset_fired, false);
                was_reset.then_some(IdleTransition::Resumed)
            }
            IdleSignal::Quiet => {
                if !self.reset_fired && now - self.last_change_at > self.threshold {
                    self.reset_fired = true;
                    Some(IdleTransition::ResetDue)
                } else {
                    None
                }
            }
            IdleSignal::Unknown => None,
        }
    }
}
