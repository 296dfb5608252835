use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use orderboard_core::store::RecordStore;
use orderboard_events::{ChangePoller, EventBus, PollerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orderboard_api::config::ServerConfig;
use orderboard_api::relay::ViewerRelay;
use orderboard_api::router::build_app_router;
use orderboard_api::state::AppState;
use orderboard_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "orderboard_api=debug,orderboard_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let poller_config = PollerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = orderboard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    orderboard_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    orderboard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store: Arc<dyn RecordStore> = Arc::new(orderboard_db::PgRecordStore::new(pool.clone()));

    // --- Viewer registry ---
    let ws_manager = Arc::new(ws::WsManager::new(config.viewer_queue_capacity));
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = tokio::spawn(ws::run_heartbeat(
        Arc::clone(&ws_manager),
        ws::HEARTBEAT_PERIOD,
        heartbeat_cancel.clone(),
    ));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Relay board events to viewers.
    let relay = ViewerRelay::new(Arc::clone(&ws_manager));
    let relay_handle = tokio::spawn(relay.run(event_bus.subscribe()));

    // Change poller.
    let poller_cancel = CancellationToken::new();
    let poller = ChangePoller::new(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        &poller_config,
        chrono::Utc::now(),
    );
    let poller_handle = tokio::spawn(poller.run(poller_cancel.clone()));

    tracing::info!("Board services started (change poller, viewer relay, heartbeat)");

    // --- App state ---
    let state = AppState {
        pool,
        store,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the poller first so nothing publishes into a closing bus.
    poller_cancel.cancel();
    match tokio::time::timeout(Duration::from_secs(5), poller_handle).await {
        Ok(Ok(watermark)) => tracing::info!(%watermark, "Change poller stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Change poller task failed"),
        Err(_) => tracing::warn!("Change poller did not stop in time"),
    }

    // Dropping the last bus sender closes the channel and ends the relay.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), relay_handle).await;
    tracing::info!("Viewer relay stopped");

    let viewers = ws_manager.connection_count().await;
    tracing::info!(viewers, "Closing remaining viewer connections");
    ws_manager.shutdown_all().await;

    heartbeat_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
