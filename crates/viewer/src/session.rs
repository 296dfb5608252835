//! One viewer connection, from the first fetch to disconnect.

use std::io::Write;

use futures::StreamExt;
use orderboard_core::highlight::HighlightTracker;
use orderboard_events::{BoardEvent, Signal};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::api::BoardApi;
use crate::client::BoardSocket;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::render::{render_board, render_cleared, Layout};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the connection or the stream ended.
    Disconnected,
    /// Shutdown was requested.
    Cancelled,
}

/// Parse a signal frame. Returns `None` for anything that is not a known
/// board signal.
pub fn parse_signal(text: &str) -> Option<BoardEvent> {
    serde_json::from_str::<Signal>(text)
        .ok()
        .map(|signal| signal.event)
}

/// Drives the screen for a single connection.
///
/// Owns the connection's [`HighlightTracker`], so the first fetch after every
/// (re)connect never rings the bell.
pub struct Session<'a, W> {
    api: &'a BoardApi,
    layout: Layout,
    tracker: HighlightTracker,
    out: W,
}

impl<'a, W: Write> Session<'a, W> {
    pub fn new(api: &'a BoardApi, config: &ViewerConfig, out: W) -> Self {
        Self {
            api,
            layout: Layout {
                preparing_rows: config.preparing_rows,
                ready_rows: config.ready_rows,
            },
            tracker: HighlightTracker::new(),
            out,
        }
    }

    pub fn tracker(&self) -> &HighlightTracker {
        &self.tracker
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Fetch the full board and redraw it.
    ///
    /// A failed fetch keeps the current screen; the next `update` retries.
    pub async fn refresh(&mut self) -> Result<(), ViewerError> {
        let snapshot = match self
            .api
            .fetch_snapshot(self.layout.preparing_rows, self.layout.ready_rows + 1)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Board fetch failed, keeping current screen");
                return Ok(());
            }
        };

        let cue = self.tracker.observe(snapshot.latest_ready_id());
        if cue {
            tracing::info!(order_id = ?snapshot.latest_ready_id(), "New order ready");
        }

        self.draw(&render_board(&snapshot, self.layout, cue))
    }

    /// Clear both lists after an idle reset.
    pub fn clear(&mut self) -> Result<(), ViewerError> {
        tracing::info!("Board reset, clearing screen");
        self.draw(&render_cleared())
    }

    /// Run until the socket closes or `cancel` fires.
    pub async fn run(
        &mut self,
        mut socket: BoardSocket,
        cancel: &CancellationToken,
    ) -> Result<SessionEnd, ViewerError> {
        // Signals are not replayed, so every connection starts from a full fetch.
        self.refresh().await?;

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = socket.close(None).await;
                    return Ok(SessionEnd::Cancelled);
                }
                frame = socket.next() => frame,
            };

            match frame {
                None | Some(Ok(Message::Close(_))) => return Ok(SessionEnd::Disconnected),
                Some(Err(e)) => return Err(ViewerError::Protocol(e.to_string())),
                Some(Ok(Message::Text(text))) => match parse_signal(&text) {
                    Some(BoardEvent::Update) => self.refresh().await?,
                    Some(BoardEvent::Reset) => self.clear()?,
                    None => tracing::warn!(frame = %text, "Ignoring unknown signal"),
                },
                Some(Ok(_)) => {}
            }
        }
    }

    fn draw(&mut self, screen: &str) -> Result<(), ViewerError> {
        self.out.write_all(screen.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
