//! Polling feed of today's triaged appointments
//!
//! A [`TriageFeed`] refreshes today's list on a fixed interval and publishes
//! each result through a `watch` channel. Subscribers always see the latest
//! successful snapshot; a failed refresh leaves it in place.

use chrono::{DateTime, FixedOffset, Local};
use salon_core::{Appointment, config::PollingConfig};
use salon_triage::{
    DailySummary, StatusCounts, StatusFilter, TriagedAppointment, summarize, triage,
};
use serde::Serialize;
use std::{fmt, sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    client::ApiClient,
    error::ClientResult,
    poll::{Latest, StopSignal, checked_period},
};

/// Source of the current instant
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant in the operator's local offset
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<FixedOffset>);

impl FixedClock {
    /// Freeze the clock at `instant`
    #[must_use]
    pub const fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Triage result of one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageSnapshot {
    /// Instant the triage was computed against
    pub taken_at: DateTime<FixedOffset>,
    /// Filter applied to `entries`
    #[serde(serialize_with = "serialize_filter")]
    pub filter: StatusFilter,
    /// Filtered appointments in priority order
    pub entries: Vec<TriagedAppointment>,
    /// Per-status counts over the whole day
    pub counts: StatusCounts,
    /// Headline numbers over the whole day
    pub summary: DailySummary,
}

fn serialize_filter<S: serde::Serializer>(
    filter: &StatusFilter,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(filter)
}

impl TriageSnapshot {
    /// Triage and summarize `appointments` against `now`
    #[must_use]
    pub fn compute(
        appointments: &[Appointment],
        now: DateTime<FixedOffset>,
        filter: StatusFilter,
    ) -> Self {
        let outcome = triage(appointments, now, filter);
        Self {
            taken_at: now,
            filter,
            entries: outcome
                .filtered
                .iter()
                .map(salon_triage::AnnotatedAppointment::to_owned_entry)
                .collect(),
            counts: outcome.counts,
            summary: summarize(appointments, now),
        }
    }
}

/// Latest published snapshot, `None` until the first successful refresh
pub type SnapshotReceiver = Latest<TriageSnapshot>;

struct FeedShared {
    client: ApiClient,
    clock: Arc<dyn Clock>,
    period: Duration,
    filter_tx: watch::Sender<StatusFilter>,
    snapshot_tx: watch::Sender<Option<Arc<TriageSnapshot>>>,
    stop: StopSignal,
}

/// Periodic refresh of today's triage
#[derive(Clone)]
pub struct TriageFeed {
    shared: Arc<FeedShared>,
}

impl fmt::Debug for TriageFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriageFeed")
            .field("clock", &self.shared.clock)
            .field("period", &self.shared.period)
            .field("filter", &*self.shared.filter_tx.borrow())
            .field("stopped", &self.shared.stop.is_raised())
            .finish_non_exhaustive()
    }
}

impl TriageFeed {
    /// Create a feed refreshing every `period`
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Configuration`] when `period` is zero.
    pub fn new(client: ApiClient, clock: Arc<dyn Clock>, period: Duration) -> ClientResult<Self> {
        let period = checked_period("triage feed", period)?;
        let (filter_tx, _) = watch::channel(StatusFilter::default());
        let (snapshot_tx, _) = watch::channel(None);

        Ok(Self {
            shared: Arc::new(FeedShared {
                client,
                clock,
                period,
                filter_tx,
                snapshot_tx,
                stop: StopSignal::new(),
            }),
        })
    }

    /// Create a feed using the configured interval for today's list
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Configuration`] when the interval is zero.
    pub fn from_config(
        client: ApiClient,
        clock: Arc<dyn Clock>,
        polling: &PollingConfig,
    ) -> ClientResult<Self> {
        Self::new(client, clock, polling.todays_interval())
    }

    /// Set the initial status filter
    #[must_use]
    pub fn with_filter(self, filter: StatusFilter) -> Self {
        self.shared.filter_tx.send_replace(filter);
        self
    }

    /// Receive every published snapshot
    #[must_use]
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.shared.snapshot_tx.subscribe()
    }

    /// Most recent snapshot
    #[must_use]
    pub fn latest(&self) -> Option<Arc<TriageSnapshot>> {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Current status filter
    #[must_use]
    pub fn filter(&self) -> StatusFilter {
        *self.shared.filter_tx.borrow()
    }

    /// Change the status filter; a running feed recomputes right away
    pub fn set_filter(&self, filter: StatusFilter) {
        let previous = self.shared.filter_tx.send_replace(filter);
        if previous != filter {
            debug!(from = %previous, to = %filter, "Triage filter changed");
        }
    }

    /// Refresh once and publish the result
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the previously published snapshot is kept.
    pub async fn refresh(&self) -> ClientResult<Arc<TriageSnapshot>> {
        self.shared.refresh().await
    }

    /// Spawn the polling loop
    ///
    /// The first refresh happens immediately. The loop ends on
    /// [`Self::shutdown`], including a shutdown requested before the start.
    #[must_use]
    pub fn start(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let mut stop_rx = shared.stop.subscribe();
        let mut filter_rx = shared.filter_tx.subscribe();

        tokio::spawn(async move {
            info!(period_secs = shared.period.as_secs(), "Triage feed started");

            let mut ticker = interval(shared.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = stop_rx.stopped() => break,
                    changed = filter_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        shared.refresh_logged().await;
                        ticker.reset();
                    }
                    _ = ticker.tick() => {
                        shared.refresh_logged().await;
                    }
                }
            }

            info!("Triage feed stopped");
        })
    }

    /// Stop the polling loop
    ///
    /// The feed stays stopped: a later [`Self::start`] exits right away.
    pub fn shutdown(&self) {
        self.shared.stop.raise();
    }
}

impl FeedShared {
    async fn refresh(&self) -> ClientResult<Arc<TriageSnapshot>> {
        let now = self.clock.now();
        let filter = *self.filter_tx.borrow();

        let snapshot = Arc::new(self.client.triage_today(now, filter).await?);
        self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));

        debug!(
            today = %now.date_naive(),
            filter = %filter,
            shown = snapshot.entries.len(),
            total = snapshot.summary.total,
            overdue = snapshot.summary.overdue,
            "Published triage snapshot"
        );
        Ok(snapshot)
    }

    async fn refresh_logged(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Failed to refresh today's appointments");
        }
    }
}
