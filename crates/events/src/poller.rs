//! Periodic change detection over the record store.
//!
//! [`ChangePoller`] runs as a background task. Each cycle captures the
//! watermark, asks the store for orders changed since then, classifies the
//! result, publishes at most one board event, feeds the idle detector and
//! finally advances the watermark. Cycles never overlap: the next tick is only
//! awaited once the current cycle, store query included, has finished.
//!
//! The poller is the single writer of the watermark and the idle state, so
//! neither needs locking.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use orderboard_core::classifier::{classify, PollOutcome};
use orderboard_core::idle::{IdleDetector, IdleTransition, DEFAULT_IDLE_THRESHOLD};
use orderboard_core::order::{OrderRecord, Phase, Transition};
use orderboard_core::store::RecordStore;
use orderboard_core::types::Timestamp;
use orderboard_core::watermark::Watermark;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::bus::{BoardEvent, EventBus};

/// Default polling interval: 2 seconds.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Prevent accidental zero/near-zero values from creating a busy loop.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// PollerConfig
// ---------------------------------------------------------------------------

/// Tunables for the change poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between the starts of consecutive cycles. A cycle that overruns
    /// delays the next tick rather than overlapping it.
    pub interval: Duration,
    /// Quiet time after the last change before a reset is broadcast.
    pub idle_threshold: chrono::Duration,
    /// How far before process start the initial watermark is placed.
    pub startup_lookback: chrono::Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            startup_lookback: chrono::Duration::zero(),
        }
    }
}

impl PollerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `POLL_INTERVAL_MS`        | `2000`  |
    /// | `IDLE_THRESHOLD_SECS`     | `10800` |
    /// | `WATERMARK_LOOKBACK_SECS` | `0`     |
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let interval = env_u64("POLL_INTERVAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval)
            .max(MIN_POLL_INTERVAL);

        let idle_threshold = env_u64("IDLE_THRESHOLD_SECS")
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
            .unwrap_or(defaults.idle_threshold);

        let startup_lookback = env_u64("WATERMARK_LOOKBACK_SECS")
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
            .unwrap_or(defaults.startup_lookback);

        Self {
            interval,
            idle_threshold,
            startup_lookback,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

// ---------------------------------------------------------------------------
// CycleReport
// ---------------------------------------------------------------------------

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Number of changed orders returned by the store.
    pub changed: usize,
    /// Whether the store query failed.
    pub failed: bool,
    /// The event published this cycle, if any.
    pub published: Option<BoardEvent>,
    /// Watermark after the cycle.
    pub watermark: Timestamp,
}

// ---------------------------------------------------------------------------
// ChangePoller
// ---------------------------------------------------------------------------

/// Background service that turns store changes into board events.
pub struct ChangePoller {
    store: Arc<dyn RecordStore>,
    bus: Arc<EventBus>,
    interval: Duration,
    watermark: Watermark,
    idle: IdleDetector,
}

impl ChangePoller {
    /// Create a poller whose engine clock starts at `start`.
    ///
    /// The idle detector starts `Active` at `start`; the watermark starts at
    /// `start - startup_lookback`.
    pub fn new(
        store: Arc<dyn RecordStore>,
        bus: Arc<EventBus>,
        config: &PollerConfig,
        start: Timestamp,
    ) -> Self {
        Self {
            store,
            bus,
            interval: config.interval,
            watermark: Watermark::new(start - config.startup_lookback),
            idle: IdleDetector::new(start, config.idle_threshold),
        }
    }

    pub fn watermark(&self) -> Timestamp {
        self.watermark.current()
    }

    pub fn idle(&self) -> &IdleDetector {
        &self.idle
    }

    /// Run one poll cycle as of `now`.
    ///
    /// `now` is captured before the query and is the value the watermark
    /// advances to, so orders that change while the query runs are seen
    /// again on the next cycle rather than skipped. Never returns an error:
    /// store failures are logged, and the watermark is held back.
    pub async fn poll_once(&mut self, now: Timestamp) -> CycleReport {
        let watermark_before = self.watermark.current();

        let fetched = self.store.fetch_changed_since(watermark_before).await;

        let (outcome, changed, failed) = match &fetched {
            Ok(records) => {
                log_changes(records, watermark_before);
                (PollOutcome::Fetched(records), records.len(), false)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    watermark = %watermark_before,
                    "Change poll failed, holding watermark"
                );
                (PollOutcome::Failed, 0, true)
            }
        };

        let classification = classify(outcome);
        let mut published = None;

        if classification.publish_update {
            let receivers = self.bus.publish(BoardEvent::Update);
            tracing::debug!(changed, receivers, "Published board update");
            published = Some(BoardEvent::Update);
        }

        match self.idle.observe(classification.idle_signal, now) {
            Some(IdleTransition::ResetDue) => {
                let idle_secs = (now - self.idle.last_change_at()).num_seconds();
                tracing::info!(idle_secs, "Inactivity threshold exceeded, resetting displays");
                self.bus.publish(BoardEvent::Reset);
                published = Some(BoardEvent::Reset);
            }
            Some(IdleTransition::Resumed) => {
                tracing::info!("Activity resumed after idle reset");
            }
            None => {}
        }

        if !failed {
            self.watermark.advance(now);
        }

        CycleReport {
            changed,
            failed,
            published,
            watermark: self.watermark.current(),
        }
    }

    /// Run the polling loop until `cancel` is triggered.
    ///
    /// Returns the last watermark so callers can persist or log it.
    pub async fn run(mut self, cancel: CancellationToken) -> Timestamp {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            idle_threshold_secs = self.idle.threshold().num_seconds(),
            watermark = %self.watermark.current(),
            "Change poller started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(watermark = %self.watermark.current(), "Change poller stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.poll_once(Utc::now()).await;
                }
            }
        }

        self.watermark.current()
    }
}

/// Log each order in a change batch, mirroring the kitchen's view of events.
fn log_changes(records: &[OrderRecord], watermark: Timestamp) {
    if records.is_empty() {
        return;
    }

    let ready = records.iter().filter(|r| r.phase == Phase::Ready).count();
    tracing::info!(
        changed = records.len(),
        ready,
        preparing = records.len() - ready,
        "Orders changed since last poll"
    );

    for record in records {
        match record.transition_since(watermark) {
            Some(Transition::BecameReady) => {
                tracing::debug!(
                    order_id = record.id,
                    label = %record.display_label,
                    "Order ready"
                );
            }
            Some(Transition::EnteredPreparing) => {
                tracing::debug!(
                    order_id = record.id,
                    label = %record.display_label,
                    phase = record.phase.as_str(),
                    "Order in preparation"
                );
            }
            None => {
                tracing::trace!(order_id = record.id, "Order re-observed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use orderboard_core::error::StoreError;
    use orderboard_core::idle::IdleState;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    /// Scripted store: pops one response per `fetch_changed_since` call and
    /// records the watermark it was asked with. An empty script answers with
    /// an empty batch.
    #[derive(Default)]
    struct ScriptedStore {
        responses: Mutex<VecDeque<Result<Vec<OrderRecord>, StoreError>>>,
        queried: Mutex<Vec<Timestamp>>,
    }

    impl ScriptedStore {
        fn push(&self, response: Result<Vec<OrderRecord>, StoreError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn queried(&self) -> Vec<Timestamp> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn fetch_changed_since(
            &self,
            watermark: Timestamp,
        ) -> Result<Vec<OrderRecord>, StoreError> {
            self.queried.lock().unwrap().push(watermark);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn fetch_ready(&self, _limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
            Ok(Vec::new())
        }

        async fn fetch_preparing(&self, _limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 6, 12, 11, 0, 0).unwrap()
    }

    fn ready_order(id: i64, ready_at: Timestamp) -> OrderRecord {
        OrderRecord::new(
            id,
            None,
            None,
            Some(ready_at - ChronoDuration::minutes(10)),
            Some(ready_at),
        )
        .unwrap()
    }

    fn setup() -> (Arc<ScriptedStore>, Arc<EventBus>, ChangePoller) {
        let store = Arc::new(ScriptedStore::default());
        let bus = Arc::new(EventBus::default());
        let poller = ChangePoller::new(
            store.clone(),
            Arc::clone(&bus),
            &PollerConfig::default(),
            t0(),
        );
        (store, bus, poller)
    }

    #[tokio::test]
    async fn batch_of_changes_publishes_one_update() {
        let (store, bus, mut poller) = setup();
        let mut rx = bus.subscribe();

        let ready_at = t0() + ChronoDuration::seconds(1);
        store.push(Ok(vec![ready_order(1, ready_at), ready_order(2, ready_at)]));

        let poll_time = t0() + ChronoDuration::seconds(2);
        let report = poller.poll_once(poll_time).await;

        assert_eq!(report.changed, 2);
        assert_eq!(report.published, Some(BoardEvent::Update));
        assert_eq!(rx.try_recv().unwrap(), BoardEvent::Update);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));

        assert_eq!(poller.idle().last_change_at(), ready_at);
        assert_eq!(poller.watermark(), poll_time);
        assert_eq!(store.queried(), vec![t0()]);
    }

    #[tokio::test]
    async fn idle_reset_fires_once_per_episode() {
        let (_store, bus, mut poller) = setup();
        let mut rx = bus.subscribe();

        let first = poller.poll_once(t0() + ChronoDuration::hours(1)).await;
        assert_eq!(first.published, None);

        let second = poller.poll_once(t0() + ChronoDuration::minutes(181)).await;
        assert_eq!(second.published, Some(BoardEvent::Reset));

        let third = poller.poll_once(t0() + ChronoDuration::minutes(182)).await;
        assert_eq!(third.published, None);

        assert_eq!(rx.try_recv().unwrap(), BoardEvent::Reset);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(poller.idle().state(), IdleState::ResetSent);
    }

    #[tokio::test]
    async fn activity_after_reset_rearms_idle_detector() {
        let (store, bus, mut poller) = setup();
        let mut rx = bus.subscribe();

        poller.poll_once(t0() + ChronoDuration::hours(4)).await;
        assert_eq!(rx.try_recv().unwrap(), BoardEvent::Reset);

        let back = t0() + ChronoDuration::hours(5);
        store.push(Ok(vec![ready_order(3, back)]));
        poller.poll_once(back).await;
        assert_eq!(rx.try_recv().unwrap(), BoardEvent::Update);
        assert_eq!(poller.idle().state(), IdleState::Active);

        poller
            .poll_once(back + ChronoDuration::hours(3) + ChronoDuration::seconds(1))
            .await;
        assert_eq!(rx.try_recv().unwrap(), BoardEvent::Reset);
    }

    #[tokio::test]
    async fn failure_holds_watermark_and_idle_state() {
        let (store, bus, mut poller) = setup();
        let mut rx = bus.subscribe();

        store.push(Err(StoreError::Unavailable("connection refused".into())));
        let report = poller.poll_once(t0() + ChronoDuration::hours(4)).await;

        assert!(report.failed);
        assert_eq!(report.published, None);
        assert_eq!(report.watermark, t0());
        assert_eq!(poller.idle().state(), IdleState::Active);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));

        // The next cycle retries from the same watermark.
        let later = t0() + ChronoDuration::hours(4) + ChronoDuration::seconds(2);
        let report = poller.poll_once(later).await;
        assert!(!report.failed);
        assert_eq!(report.watermark, later);
        assert_eq!(store.queried(), vec![t0(), t0()]);
    }

    #[tokio::test]
    async fn empty_cycles_advance_watermark_monotonically() {
        let (store, _bus, mut poller) = setup();

        let mut last = poller.watermark();
        for secs in [2, 4, 3, 6] {
            let report = poller.poll_once(t0() + ChronoDuration::seconds(secs)).await;
            assert!(report.watermark >= last);
            last = report.watermark;
        }

        assert_eq!(last, t0() + ChronoDuration::seconds(6));
        assert_eq!(
            store.queried(),
            vec![
                t0(),
                t0() + ChronoDuration::seconds(2),
                t0() + ChronoDuration::seconds(4),
                t0() + ChronoDuration::seconds(4),
            ]
        );
    }

    #[tokio::test]
    async fn repeated_empty_cycles_publish_nothing() {
        let (_store, bus, mut poller) = setup();
        let mut rx = bus.subscribe();

        poller.poll_once(t0() + ChronoDuration::seconds(2)).await;
        poller.poll_once(t0() + ChronoDuration::seconds(4)).await;

        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn startup_lookback_moves_initial_watermark() {
        let store = Arc::new(ScriptedStore::default());
        let config = PollerConfig {
            startup_lookback: ChronoDuration::minutes(5),
            ..PollerConfig::default()
        };
        let poller = ChangePoller::new(store, Arc::new(EventBus::default()), &config, t0());

        assert_eq!(poller.watermark(), t0() - ChronoDuration::minutes(5));
        assert_eq!(poller.idle().last_change_at(), t0());
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let store = Arc::new(ScriptedStore::default());
        let config = PollerConfig {
            interval: MIN_POLL_INTERVAL,
            ..PollerConfig::default()
        };
        let poller = ChangePoller::new(
            store.clone(),
            Arc::new(EventBus::default()),
            &config,
            Utc::now(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poller.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(250)).await;
        cancel.cancel();

        let watermark = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller should stop promptly")
            .expect("poller task should not panic");

        assert!(!store.queried().is_empty());
        assert!(watermark >= *store.queried().last().unwrap());
    }
}
