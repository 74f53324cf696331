//! Periodic refresh of backend resources
//!
//! A [`Poller`] runs one fetch per interval on a spawned task and publishes
//! every successful result through a `watch` channel. A failed fetch is
//! logged and the previous value stays published. The `ApiClient::poll_*`
//! constructors wire the dashboard resources to their configured intervals.

use salon_core::{Appointment, config::PollingConfig, types::AppointmentFilters};
use salon_triage::StatusTotals;
use std::{fmt, sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    client::ApiClient,
    error::{ClientError, ClientResult},
};

/// Latest published value, `None` until the first successful fetch
pub type Latest<T> = watch::Receiver<Option<Arc<T>>>;

/// Reject a zero refresh period
pub(crate) fn checked_period(name: &str, period: Duration) -> ClientResult<Duration> {
    if period.is_zero() {
        return Err(ClientError::configuration(format!(
            "{name} refresh period must be greater than zero"
        )));
    }
    Ok(period)
}

/// Stop flag shared by a polling loop and its owner
///
/// Once raised the flag stays raised, so a loop started afterwards exits
/// before its first fetch.
#[derive(Debug)]
pub(crate) struct StopSignal(watch::Sender<bool>);

impl StopSignal {
    pub(crate) fn new() -> Self {
        Self(watch::channel(false).0)
    }

    pub(crate) fn raise(&self) {
        self.0.send_replace(true);
    }

    pub(crate) fn is_raised(&self) -> bool {
        *self.0.borrow()
    }

    pub(crate) fn subscribe(&self) -> StopListener {
        StopListener(self.0.subscribe())
    }
}

/// Receiving side of a [`StopSignal`]
#[derive(Debug)]
pub(crate) struct StopListener(watch::Receiver<bool>);

impl StopListener {
    /// Resolve once the signal is raised or its owner is gone
    pub(crate) async fn stopped(&mut self) {
        while !*self.0.borrow_and_update() {
            if self.0.changed().await.is_err() {
                return;
            }
        }
    }
}

/// A background task refreshing one value on a fixed interval
///
/// Dropping the poller stops its task.
pub struct Poller<T> {
    name: &'static str,
    period: Duration,
    latest_rx: Latest<T>,
    stop: StopSignal,
    handle: JoinHandle<()>,
}

impl<T> fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("stopped", &self.stop.is_raised())
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Poller<T> {
    /// Spawn a loop calling `fetch` every `period`, starting immediately
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when `period` is zero.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, fetch: F) -> ClientResult<Self>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let period = checked_period(name, period)?;
        let (latest_tx, latest_rx) = watch::channel(None);
        let stop = StopSignal::new();
        let mut stop_rx = stop.subscribe();

        let handle = tokio::spawn(async move {
            info!(poller = name, period_secs = period.as_secs(), "Poller started");

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = stop_rx.stopped() => break,
                    _ = ticker.tick() => match fetch().await {
                        Ok(value) => {
                            latest_tx.send_replace(Some(Arc::new(value)));
                            debug!(poller = name, "Published refreshed value");
                        }
                        Err(e) => {
                            warn!(poller = name, error = %e, "Refresh failed, keeping previous value");
                        }
                    },
                }
            }

            info!(poller = name, "Poller stopped");
        });

        Ok(Self {
            name,
            period,
            latest_rx,
            stop,
            handle,
        })
    }

    /// Name used in log events
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Receive every published value
    #[must_use]
    pub fn subscribe(&self) -> Latest<T> {
        self.latest_rx.clone()
    }

    /// Most recent value
    #[must_use]
    pub fn latest(&self) -> Option<Arc<T>> {
        self.latest_rx.borrow().clone()
    }

    /// Signal the loop to stop without waiting for it
    pub fn shutdown(&self) {
        self.stop.raise();
    }

    /// Stop the loop and wait for it to finish
    pub async fn stop(self) {
        self.stop.raise();
        if let Err(e) = self.handle.await {
            warn!(poller = self.name, error = %e, "Poller task ended abnormally");
        }
    }
}

impl ApiClient {
    /// Poll every appointment matching `filters` on the appointment-list interval
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the interval is zero.
    pub fn poll_appointments(
        &self,
        filters: AppointmentFilters,
        polling: &PollingConfig,
    ) -> ClientResult<Poller<Vec<Appointment>>> {
        let client = self.clone();
        Poller::spawn("appointments", polling.appointments_interval(), move || {
            let client = client.clone();
            let filters = filters.clone();
            async move { client.list_all_appointments(&filters).await }
        })
    }

    /// Poll the per-status totals on the statistics interval
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the interval is zero.
    pub fn poll_status_totals(&self, polling: &PollingConfig) -> ClientResult<Poller<StatusTotals>> {
        let client = self.clone();
        Poller::spawn("status_totals", polling.stats_interval(), move || {
            let client = client.clone();
            async move { client.status_totals().await }
        })
    }

    /// Poll the payment-pending list on its interval
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the interval is zero.
    pub fn poll_payment_pending(
        &self,
        polling: &PollingConfig,
    ) -> ClientResult<Poller<Vec<Appointment>>> {
        let client = self.clone();
        Poller::spawn(
            "payment_pending",
            polling.payment_pending_interval(),
            move || {
                let client = client.clone();
                async move { client.payment_pending().await }
            },
        )
    }
}
