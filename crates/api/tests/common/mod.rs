#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::TimeZone;
use http_body_util::BodyExt;
use orderboard_core::error::StoreError;
use orderboard_core::order::{OrderRecord, Phase};
use orderboard_core::store::RecordStore;
use orderboard_core::types::Timestamp;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use orderboard_api::config::ServerConfig;
use orderboard_api::router::build_app_router;
use orderboard_api::state::AppState;
use orderboard_api::ws::WsManager;

// ---------------------------------------------------------------------------
// In-memory record store
// ---------------------------------------------------------------------------

/// In-memory [`RecordStore`] with a switch to simulate an outage.
#[derive(Default)]
pub struct MemoryStore {
    orders: Mutex<Vec<OrderRecord>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn with_orders(orders: Vec<OrderRecord>) -> Self {
        Self {
            orders: Mutex::new(orders),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".into()))
        } else {
            Ok(())
        }
    }

    fn in_phase(&self, phase: Phase) -> Vec<OrderRecord> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.phase == phase)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_changed_since(
        &self,
        watermark: Timestamp,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        self.check()?;
        let mut changed: Vec<_> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.transition_since(watermark).is_some())
            .cloned()
            .collect();
        changed.sort_by_key(|o| std::cmp::Reverse(o.last_changed_at()));
        Ok(changed)
    }

    async fn fetch_ready(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
        self.check()?;
        let mut ready = self.in_phase(Phase::Ready);
        ready.sort_by_key(|o| std::cmp::Reverse(o.became_ready_at));
        ready.truncate(limit as usize);
        Ok(ready)
    }

    async fn fetch_preparing(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
        self.check()?;
        let mut preparing = self.in_phase(Phase::Preparing);
        preparing.sort_by_key(|o| o.entered_preparing_at);
        preparing.truncate(limit as usize);
        Ok(preparing)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn t0() -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap()
}

pub fn preparing(id: i64, name: Option<&str>, offset_secs: i64) -> OrderRecord {
    OrderRecord::new(
        id,
        name.map(str::to_string),
        None,
        Some(t0() + chrono::Duration::seconds(offset_secs)),
        None,
    )
    .unwrap()
}

pub fn ready(id: i64, name: Option<&str>, offset_secs: i64) -> OrderRecord {
    OrderRecord::new(
        id,
        name.map(str::to_string),
        None,
        Some(t0()),
        Some(t0() + chrono::Duration::seconds(offset_secs)),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        viewer_queue_capacity: 8,
        preparing_limit: 20,
        ready_limit: 10,
        static_dir: None,
    }
}

/// A pool that never connects; for tests that do not touch the database.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://orderboard@127.0.0.1:1/unused")
        .expect("lazy pool URL should parse")
}

/// Build the full application router around the given store and pool.
///
/// Uses the same builder as `main.rs`, so the middleware stack matches
/// production.
pub fn build_test_app_with(
    pool: PgPool,
    store: Arc<dyn RecordStore>,
    ws_manager: Arc<WsManager>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        store,
        config: Arc::new(config.clone()),
        ws_manager,
    };
    build_app_router(state, &config)
}

pub fn build_test_app(store: Arc<dyn RecordStore>) -> Router {
    build_test_app_with(unreachable_pool(), store, Arc::new(WsManager::new(8)))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
