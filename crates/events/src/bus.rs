//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish side of the board's broadcast channel. It is
//! shared via `Arc<EventBus>`; the viewer relay in the API server subscribes
//! and fans events out to connected screens.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BoardEvent
// ---------------------------------------------------------------------------

/// The two signals viewers receive. Neither carries data: viewers re-fetch
/// the lists on `Update` and clear their screen on `Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEvent {
    Update,
    Reset,
}

impl BoardEvent {
    pub fn name(self) -> &'static str {
        match self {
            BoardEvent::Update => "update",
            BoardEvent::Reset => "reset",
        }
    }
}

/// Wire form of a [`BoardEvent`]: `{"event":"update"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub event: BoardEvent,
}

impl Signal {
    pub fn to_json(self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self)
    }
}

impl From<BoardEvent> for Signal {
    fn from(event: BoardEvent) -> Self {
        Self { event }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out event bus.
///
/// Publishing never blocks and never fails. There is no replay: a
/// subscriber only sees events published after it subscribed.
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it; zero is not an
    /// error.
    pub fn publish(&self, event: BoardEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
