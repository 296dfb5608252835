use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orderboard_viewer::api::BoardApi;
use orderboard_viewer::client::BoardClient;
use orderboard_viewer::config::ViewerConfig;
use orderboard_viewer::reconnect::{reconnect_loop, ReconnectConfig};
use orderboard_viewer::session::{Session, SessionEnd};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the board on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orderboard_viewer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ViewerConfig::from_env();
    tracing::info!(url = %config.base_url, "Starting viewer");

    let api = BoardApi::new(config.base_url.clone());
    let client = BoardClient::new(config.ws_url());
    let reconnect = ReconnectConfig::default();

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl-C), stopping viewer");
        }
        ctrl_c_cancel.cancel();
    });

    while let Some(socket) = reconnect_loop(&client, &reconnect, &cancel).await {
        let mut session = Session::new(&api, &config, std::io::stdout());
        match session.run(socket, &cancel).await {
            Ok(SessionEnd::Cancelled) => break,
            Ok(SessionEnd::Disconnected) => tracing::warn!("Board connection closed"),
            Err(e) => tracing::warn!(error = %e, "Board connection failed"),
        }
    }

    tracing::info!("Viewer stopped");
}
