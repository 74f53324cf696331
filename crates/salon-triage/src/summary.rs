//! Headline numbers for today's appointments

use chrono::{DateTime, FixedOffset};
use salon_core::{Appointment, AppointmentStatus};
use serde::Serialize;

use crate::triage::Now;

/// Counts shown above today's list
///
/// Every field is computed over the whole input; the status filter of the
/// priority list does not apply here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DailySummary {
    /// Booked on the local calendar day of `now`
    pub new_bookings: usize,
    /// Still booked, awaiting confirmation
    pub pending_confirmation: usize,
    /// Confirmed
    pub confirmed: usize,
    /// Completed
    pub completed: usize,
    /// Cancelled
    pub cancelled: usize,
    /// No-show
    pub no_show: usize,
    /// Pending appointments whose slot today has passed
    pub overdue: usize,
    /// Size of the input
    pub total: usize,
}

impl DailySummary {
    /// Whether anything on the list needs an operator right now
    #[must_use]
    pub const fn needs_action(&self) -> bool {
        self.new_bookings > 0 || self.pending_confirmation > 0 || self.overdue > 0
    }
}

/// Summarize a day's appointments against `now`
#[must_use]
pub fn summarize(appointments: &[Appointment], now: DateTime<FixedOffset>) -> DailySummary {
    let now = Now::capture(now);

    appointments
        .iter()
        .fold(DailySummary::default(), |mut summary, appointment| {
            summary.total += 1;
            if now.booked_today(appointment) {
                summary.new_bookings += 1;
            }
            if now.is_overdue(appointment) {
                summary.overdue += 1;
            }
            match appointment.status {
                AppointmentStatus::Booked => summary.pending_confirmation += 1,
                AppointmentStatus::Confirmed => summary.confirmed += 1,
                AppointmentStatus::Completed => summary.completed += 1,
                AppointmentStatus::Cancelled => summary.cancelled += 1,
                AppointmentStatus::NoShow => summary.no_show += 1,
                AppointmentStatus::Unknown => {}
            }
            summary
        })
}
