//! Exponential-backoff reconnection to the board.
//!
//! When the signal connection drops, the viewer calls [`reconnect_loop`]
//! to keep retrying with increasing delays until either the connection is
//! restored or the [`CancellationToken`] is triggered.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{BoardClient, BoardSocket};

/// Tunable parameters for the exponential-backoff strategy.
pub struct ReconnectConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Connect to the board, retrying with exponential backoff.
///
/// Returns `Some(socket)` once a connection succeeds, or `None` if `cancel`
/// is triggered first.
pub async fn reconnect_loop(
    client: &BoardClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<BoardSocket> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(url = client.ws_url(), "Reconnect cancelled");
                return None;
            }
            result = client.connect() => {
                match result {
                    Ok(socket) => {
                        if attempt > 1 {
                            tracing::info!(url = client.ws_url(), attempt, "Reconnected to order board");
                        }
                        return Some(socket);
                    }
                    Err(e) => {
                        tracing::warn!(
                            url = client.ws_url(),
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "Connect attempt {attempt} failed",
                        );
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}
