//! Change detection and notification for the order board.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying [`BoardEvent`]s.
//! - [`ChangePoller`]: background service that polls the record store,
//!   classifies each cycle, publishes `update`/`reset` and tracks idleness.

pub mod bus;
pub mod poller;

pub use bus::{BoardEvent, EventBus, Signal};
pub use poller::{ChangePoller, CycleReport, PollerConfig};
