//! Domain types and pure state machines for the order board.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! database layer, the change poller, the API server and the viewer client.

pub mod classifier;
pub mod error;
pub mod highlight;
pub mod idle;
pub mod order;
pub mod store;
pub mod types;
pub mod watermark;
