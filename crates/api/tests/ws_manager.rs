//! Unit tests for `WsManager`.
//!
//! These tests exercise the viewer registry directly, without performing any
//! HTTP upgrades. They verify add/remove semantics, fan-out delivery,
//! slow-viewer isolation and graceful shutdown.

use axum::extract::ws::Message;
use orderboard_api::ws::{BroadcastReport, WsManager};

fn text(s: &str) -> Message {
    Message::Text(s.to_string().into())
}

// ---------------------------------------------------------------------------
// Test: add() and remove()
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::default();
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::default();

    let _rx = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: broadcast() reaches every viewer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_delivers_to_all_viewers() {
    let manager = WsManager::default();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let report = manager.broadcast(text("hello")).await;
    assert_eq!(
        report,
        BroadcastReport {
            delivered: 2,
            dropped: 0,
            removed: 0
        }
    );

    assert!(matches!(rx1.recv().await, Some(Message::Text(t)) if t.as_str() == "hello"));
    assert!(matches!(rx2.recv().await, Some(Message::Text(t)) if t.as_str() == "hello"));
}

// ---------------------------------------------------------------------------
// Test: a slow viewer loses messages without affecting others
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_drops_only_for_that_viewer() {
    let manager = WsManager::new(1);
    let mut slow = manager.add("slow".to_string()).await;
    let mut fast = manager.add("fast".to_string()).await;

    manager.broadcast(text("first")).await;
    // Drain only the fast viewer.
    assert!(fast.recv().await.is_some());

    let report = manager.broadcast(text("second")).await;
    assert_eq!(report.delivered, 1);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.removed, 0);

    assert!(matches!(fast.recv().await, Some(Message::Text(t)) if t.as_str() == "second"));
    assert!(matches!(slow.recv().await, Some(Message::Text(t)) if t.as_str() == "first"));
    assert!(slow.try_recv().is_err());

    // The slow viewer stays registered.
    assert_eq!(manager.connection_count().await, 2);
}

// ---------------------------------------------------------------------------
// Test: a dead viewer is removed on the next broadcast
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_viewer_is_removed() {
    let manager = WsManager::default();
    let rx_dead = manager.add("dead".to_string()).await;
    let mut rx_alive = manager.add("alive".to_string()).await;
    drop(rx_dead);

    let report = manager.broadcast(text("update")).await;
    assert_eq!(report.delivered, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(manager.connection_count().await, 1);
    assert!(rx_alive.recv().await.is_some());
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends Ping frames
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::default();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::default();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
    // Senders are dropped with the map, so the channels end.
    assert!(rx1.recv().await.is_none());
}
