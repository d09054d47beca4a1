// Refresh scheduler - periodic provider polling with a single cancellable timer
use crate::application::dashboard_state::SharedDashboard;
use crate::application::gateway::{ClientGateway, GatewayError};
use crate::application::loading::LoadingIndicator;
use crate::domain::series::reshape;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Fetching,
    Scheduled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub phase: Phase,
    pub interval_secs: u64,
    pub next_update_time: i64,
    pub last_refreshed: Option<chrono::DateTime<chrono::Utc>>,
    pub loading: bool,
}

/// Keeps the dashboard series current.
///
/// A successful manual refresh arms a repeating timer at a fixed interval; a
/// failed one leaves polling paused until the next manual refresh. Every fetch
/// gets a sequence number at dispatch so a slow response can never overwrite a
/// newer one.
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    gateway: Arc<ClientGateway>,
    state: SharedDashboard,
    loading: LoadingIndicator,
    fetching: LoadingIndicator,
    interval: Duration,
    window: u32,
    sequence: AtomicU64,
    shut_down: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(
        gateway: Arc<ClientGateway>,
        state: SharedDashboard,
        loading: LoadingIndicator,
        interval: Duration,
        window: u32,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                gateway,
                state,
                loading,
                fetching: LoadingIndicator::new(),
                interval,
                window,
                sequence: AtomicU64::new(0),
                shut_down: AtomicBool::new(false),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Manual refresh: disarm, fetch, and rearm only if the fetch succeeded
    pub async fn refresh(&self) -> Result<(), GatewayError> {
        self.disarm();
        let _loading = self.inner.loading.start();

        match self.inner.fetch_and_apply().await {
            Ok(()) => {
                self.arm();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Provider refresh failed, polling paused");
                Err(e)
            }
        }
    }

    /// Stop polling for good. In-flight fetches still land but never rearm.
    pub fn shutdown(&self) {
        let mut timer = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.shut_down.store(true, Ordering::SeqCst);
        if let Some(handle) = timer.take() {
            handle.abort();
            tracing::info!("Refresh timer released");
        }
    }

    pub fn phase(&self) -> Phase {
        if self.inner.fetching.is_loading() {
            Phase::Fetching
        } else if self.is_armed() {
            Phase::Scheduled
        } else {
            Phase::Idle
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        let state = self.inner.state.read().await;
        SchedulerStatus {
            phase: self.phase(),
            interval_secs: self.inner.interval.as_secs(),
            next_update_time: state.next_update_time,
            last_refreshed: state.last_refreshed,
            loading: self.inner.loading.is_loading(),
        }
    }

    fn is_armed(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn disarm(&self) -> bool {
        let mut timer = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
        match timer.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel-then-rearm under one lock, so at most one timer is ever live
    fn arm(&self) {
        let mut timer = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        if self.inner.shut_down.load(Ordering::SeqCst) {
            tracing::debug!("Scheduler shut down, timer not rearmed");
            return;
        }

        let period = self.inner.interval;
        let weak = Arc::downgrade(&self.inner);
        *timer = Some(tokio::spawn(poll_loop(weak, period)));
        tracing::debug!(interval_secs = period.as_secs(), "Refresh timer armed");
    }
}

async fn poll_loop(weak: Weak<SchedulerInner>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            break;
        };

        // Detached so that rearming the timer never cancels a request in flight
        tokio::spawn(async move {
            if let Err(e) = inner.fetch_and_apply().await {
                tracing::warn!(error = %e, "Scheduled provider refresh failed");
            }
        });
    }
}

impl SchedulerInner {
    async fn fetch_and_apply(&self) -> Result<(), GatewayError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let _fetching = self.fetching.start();

        let snapshot = self.gateway.list_providers(self.window).await?;
        let series = reshape(&snapshot);
        let series_count = series.len();

        let mut state = self.state.write().await;
        if state.apply(sequence, series, snapshot.next_update_time) {
            tracing::debug!(
                sequence,
                series = series_count,
                next_update_time = snapshot.next_update_time,
                "Applied provider snapshot"
            );
        } else {
            tracing::debug!(sequence, "Discarded stale provider snapshot");
        }
        Ok(())
    }
}
