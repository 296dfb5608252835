//! Last-checked timestamp of the change poller.

use crate::types::Timestamp;

/// "Changes strictly after this instant have already been considered."
///
/// Owned by a single poller. [`advance`](Watermark::advance) never moves the
/// watermark backwards, so a clock step back on the host cannot make the
/// poller re-deliver an unbounded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    current: Timestamp,
}

impl Watermark {
    pub fn new(start: Timestamp) -> Self {
        Self { current: start }
    }

    pub fn current(&self) -> Timestamp {
        self.current
    }

    /// Move the watermark to `now`. Earlier values are ignored.
    ///
    /// Returns `true` if the watermark moved.
    pub fn advance(&mut self, now: Timestamp) -> bool {
        if now > self.current {
            self.current = now;
            true
        } else {
            false
        }
    }
}
