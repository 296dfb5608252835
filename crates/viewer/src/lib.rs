//! Terminal viewer for the order board.
//!
//! Connects to the board's WebSocket, fetches the preparing and ready lists
//! over HTTP whenever an `update` signal arrives, clears the screen on
//! `reset`, and rings the terminal bell when a new order becomes ready.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod reconnect;
pub mod render;
pub mod session;
