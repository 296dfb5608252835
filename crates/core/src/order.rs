//! Order records as seen by the board.
//!
//! An order is observable in two phases: `preparing` once the kitchen has
//! started on it, and `ready` once it can be picked up. Orders that have not
//! entered preparation yet are never returned by the record store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The observable phase of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preparing,
    Ready,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Preparing => "preparing",
            Phase::Ready => "ready",
        }
    }
}

/// Which transition made an order show up in a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    EnteredPreparing,
    BecameReady,
}

// ---------------------------------------------------------------------------
// OrderRecord
// ---------------------------------------------------------------------------

/// One customer order tracked through `preparing` and `ready`.
///
/// Built through [`OrderRecord::new`], which enforces that `became_ready_at`
/// is present exactly when the phase is `ready` and never precedes
/// `entered_preparing_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: DbId,
    /// Ticket-style label, always `#<id>`.
    pub ticket: String,
    /// Customer name when present and non-blank, otherwise the ticket.
    pub display_label: String,
    pub customer_name: Option<String>,
    pub phase: Phase,
    pub placed_at: Option<Timestamp>,
    pub entered_preparing_at: Timestamp,
    pub became_ready_at: Option<Timestamp>,
}

impl OrderRecord {
    /// Build a record from raw store columns.
    ///
    /// `preparing_at` being `None` while `ready_at` is set, or `ready_at`
    /// preceding `preparing_at`, yields [`CoreError::InvalidOrder`]. A row with
    /// neither timestamp is an unseen order and is rejected the same way since
    /// the board never displays it.
    pub fn new(
        id: DbId,
        customer_name: Option<String>,
        placed_at: Option<Timestamp>,
        preparing_at: Option<Timestamp>,
        ready_at: Option<Timestamp>,
    ) -> Result<Self, CoreError> {
        let entered_preparing_at = preparing_at.ok_or_else(|| CoreError::InvalidOrder {
            id,
            reason: "missing preparing timestamp".to_string(),
        })?;

        if let Some(ready) = ready_at {
            if ready < entered_preparing_at {
                return Err(CoreError::InvalidOrder {
                    id,
                    reason: format!(
                        "ready at {ready} precedes preparing at {entered_preparing_at}"
                    ),
                });
            }
        }

        let phase = if ready_at.is_some() {
            Phase::Ready
        } else {
            Phase::Preparing
        };

        Ok(Self {
            id,
            ticket: ticket_label(id),
            display_label: display_label(id, customer_name.as_deref()),
            customer_name,
            phase,
            placed_at,
            entered_preparing_at,
            became_ready_at: ready_at,
        })
    }

    /// Timestamp of the most recent transition of this order.
    pub fn last_changed_at(&self) -> Timestamp {
        self.became_ready_at.unwrap_or(self.entered_preparing_at)
    }

    /// The transition that happened strictly after `watermark`, if any.
    ///
    /// Becoming ready takes precedence when both happened in the window.
    pub fn transition_since(&self, watermark: Timestamp) -> Option<Transition> {
        match self.became_ready_at {
            Some(ready) if ready > watermark => Some(Transition::BecameReady),
            _ if self.entered_preparing_at > watermark => Some(Transition::EnteredPreparing),
            _ => None,
        }
    }
}

/// Ticket-style label for an order id.
pub fn ticket_label(id: DbId) -> String {
    format!("#{id}")
}

/// Label shown on screen: the trimmed customer name, or the ticket label.
pub fn display_label(id: DbId, customer_name: Option<&str>) -> String {
    match customer_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ticket_label(id),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn label_prefers_customer_name() {
        assert_eq!(display_label(7, Some("Maria")), "Maria");
    }

    #[test]
    fn label_trims_customer_name() {
        assert_eq!(display_label(7, Some("  Ana  ")), "Ana");
    }

    #[test]
    fn blank_name_falls_back_to_ticket() {
        assert_eq!(display_label(42, Some("   ")), "#42");
        assert_eq!(display_label(42, None), "#42");
    }

    #[test]
    fn preparing_record_has_no_ready_time() {
        let order = OrderRecord::new(1, None, None, Some(t0()), None).unwrap();
        assert_eq!(order.phase, Phase::Preparing);
        assert_eq!(order.became_ready_at, None);
        assert_eq!(order.ticket, "#1");
        assert_eq!(order.display_label, "#1");
    }

    #[test]
    fn ready_record_carries_ready_time() {
        let ready = t0() + Duration::minutes(5);
        let order =
            OrderRecord::new(2, Some("João".into()), None, Some(t0()), Some(ready)).unwrap();
        assert_eq!(order.phase, Phase::Ready);
        assert_eq!(order.became_ready_at, Some(ready));
        assert_eq!(order.last_changed_at(), ready);
        assert_eq!(order.display_label, "João");
    }

    #[test]
    fn ready_without_preparing_is_rejected() {
        let result = OrderRecord::new(3, None, None, None, Some(t0()));
        assert_matches!(result, Err(CoreError::InvalidOrder { id: 3, .. }));
    }

    #[test]
    fn ready_before_preparing_is_rejected() {
        let result =
            OrderRecord::new(4, None, None, Some(t0()), Some(t0() - Duration::seconds(1)));
        assert_matches!(result, Err(CoreError::InvalidOrder { id: 4, .. }));
    }

    #[test]
    fn ready_at_same_instant_as_preparing_is_accepted() {
        let order = OrderRecord::new(5, None, None, Some(t0()), Some(t0())).unwrap();
        assert_eq!(order.phase, Phase::Ready);
    }

    #[test]
    fn transition_since_prefers_ready() {
        let order = OrderRecord::new(
            6,
            None,
            None,
            Some(t0() + Duration::seconds(1)),
            Some(t0() + Duration::seconds(2)),
        )
        .unwrap();
        assert_eq!(order.transition_since(t0()), Some(Transition::BecameReady));
    }

    #[test]
    fn transition_since_reports_preparing_only_when_in_window() {
        let order =
            OrderRecord::new(8, None, None, Some(t0() + Duration::seconds(1)), None).unwrap();
        assert_eq!(
            order.transition_since(t0()),
            Some(Transition::EnteredPreparing)
        );
        assert_eq!(order.transition_since(t0() + Duration::seconds(1)), None);
    }
}
