//! Staleness-gated data refresh
//!
//! A [`Refresher`] decides from the cache file's age whether the SMN feed has
//! to be queried again, and only replaces the cache when a fetch succeeds so
//! the last good data always stays servable. A [`Scheduler`] re-runs the
//! check on a fixed timer as a backstop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::EnvelopeStore;
use crate::data::WeatherSource;

/// Shortest timer period; `tokio::time::interval` rejects zero
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// What a timer tick does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Fetch only when the cache is at least one interval old
    WhenStale,
    /// Fetch on every tick
    Always,
}

/// Fetches fresh readings into the cache file when needed
pub struct Refresher<S> {
    source: S,
    store: EnvelopeStore,
    interval: Duration,
    /// Timestamp of the last envelope this refresher wrote
    last_update: RwLock<Option<DateTime<Utc>>>,
}

impl<S: WeatherSource> Refresher<S> {
    pub fn new(source: S, store: EnvelopeStore, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
            last_update: RwLock::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn store(&self) -> &EnvelopeStore {
        &self.store
    }

    /// Refreshes the cache if it is missing or at least one interval old
    ///
    /// Returns `true` when new data was written. A fresh cache is left alone
    /// and no fetch happens.
    pub async fn maybe_refresh(&self) -> bool {
        if let Some(age) = self.store.age_async().await {
            if age < self.interval {
                debug!(age_secs = age.as_secs(), "Cached data is fresh");
                return false;
            }
        }

        info!("Cached data is stale or missing, fetching fresh readings");
        self.refresh_now().await
    }

    /// Fetches unconditionally and replaces the cache on success
    ///
    /// A failed fetch leaves the existing cache file untouched.
    pub async fn refresh_now(&self) -> bool {
        let envelope = self.source.fetch().await;

        if !envelope.success {
            warn!(
                error = envelope.error().unwrap_or("unknown error"),
                "Refresh failed, keeping previous data"
            );
            return false;
        }

        let timestamp = envelope.timestamp;
        let stations = envelope.readings().map_or(0, |r| r.len());
        if let Err(e) = self.store.write_async(envelope).await {
            error!(error = %e, path = %self.store.path().display(), "Failed to write cache file");
            return false;
        }

        *self.last_update.write().await = Some(timestamp);
        info!(stations, "Weather data refreshed");
        true
    }

    /// When this refresher last wrote new data
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read().await
    }

    /// Snapshot of the refresh state
    pub async fn status(&self, running: bool) -> RefreshStatus {
        let last_update = self.last_update().await;
        let next_update = match (running, last_update) {
            (true, Some(last)) => chrono::Duration::from_std(self.interval)
                .ok()
                .map(|interval| last + interval),
            _ => None,
        };

        RefreshStatus {
            running,
            interval_minutes: self.interval.as_secs() / 60,
            last_update,
            next_update,
        }
    }
}

/// Reported state of the auto-refresh loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub running: bool,
    pub interval_minutes: u64,
    pub last_update: Option<DateTime<Utc>>,
    /// Only known while running and after a first successful update
    pub next_update: Option<DateTime<Utc>>,
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_time = |t: Option<DateTime<Utc>>, none: &str| {
            t.map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| none.to_string())
        };

        write!(
            f,
            "state: {}, interval: {} min, last update: {}, next update: {}",
            if self.running { "running" } else { "stopped" },
            self.interval_minutes,
            fmt_time(self.last_update, "never"),
            fmt_time(self.next_update, "not scheduled"),
        )
    }
}

/// Signal reported by a scheduler transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    AlreadyRunning,
    Stopped,
    NotRunning,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Transition::Started => "auto-refresh started",
            Transition::AlreadyRunning => "auto-refresh is already running",
            Transition::Stopped => "auto-refresh stopped",
            Transition::NotRunning => "auto-refresh is not running",
        };
        f.write_str(text)
    }
}

/// Timer that re-runs the refresh check
///
/// Transitions consume the current state and hand back the next one together
/// with a [`Transition`]; starting a running scheduler or stopping a stopped
/// one is a no-op that only reports it.
#[derive(Debug, Default)]
pub enum Scheduler {
    #[default]
    Stopped,
    Running {
        interval: Duration,
        handle: JoinHandle<()>,
    },
}

impl Scheduler {
    /// Runs one refresh immediately, then one every interval
    pub fn start<S>(self, refresher: Arc<Refresher<S>>, mode: RefreshMode) -> (Self, Transition)
    where
        S: WeatherSource + 'static,
    {
        match self {
            running @ Scheduler::Running { .. } => (running, Transition::AlreadyRunning),
            Scheduler::Stopped => {
                let interval = refresher.interval();
                info!(
                    interval_minutes = interval.as_secs() / 60,
                    ?mode,
                    "Starting auto-refresh"
                );
                let handle = tokio::spawn(run_timer(refresher, mode));
                (Scheduler::Running { interval, handle }, Transition::Started)
            }
        }
    }

    /// Cancels the timer
    ///
    /// A fetch in flight at that moment is dropped with the task.
    pub fn stop(self) -> (Self, Transition) {
        match self {
            Scheduler::Stopped => (Scheduler::Stopped, Transition::NotRunning),
            Scheduler::Running { handle, .. } => {
                handle.abort();
                info!("Auto-refresh stopped");
                (Scheduler::Stopped, Transition::Stopped)
            }
        }
    }

    /// Whether the timer task is alive
    pub fn is_running(&self) -> bool {
        match self {
            Scheduler::Running { handle, .. } => !handle.is_finished(),
            Scheduler::Stopped => false,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        match self {
            Scheduler::Running { interval, .. } => Some(*interval),
            Scheduler::Stopped => None,
        }
    }
}

async fn run_timer<S: WeatherSource>(refresher: Arc<Refresher<S>>, mode: RefreshMode) {
    let mut ticker = tokio::time::interval(refresher.interval().max(MIN_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // The first tick completes immediately
        ticker.tick().await;
        debug!("Auto-refresh tick");
        match mode {
            RefreshMode::WhenStale => {
                refresher.maybe_refresh().await;
            }
            RefreshMode::Always => {
                refresher.refresh_now().await;
            }
        }
    }
}
