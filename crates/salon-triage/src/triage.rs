//! Triage of today's appointments
//!
//! Annotates each appointment with the `is_new` and `needs_attention` flags,
//! filters by status and orders the result so the entries needing an
//! operator come first. The current instant is an explicit argument and is
//! reduced once per run to a [`Now`], so every entry of a batch is judged
//! against the same reference.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use salon_core::{Appointment, AppointmentStatus, utils};
use serde::Serialize;
use std::{cmp::Reverse, collections::BTreeMap, fmt, str::FromStr};
use tracing::debug;

/// Number of appointments per lifecycle status
///
/// Statuses without appointments are absent.
pub type StatusCounts = BTreeMap<AppointmentStatus, usize>;

/// Which appointments the priority list shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// Everything that is not completed, cancelled or no-show
    #[default]
    Active,
    /// Exactly one status, terminal ones included
    Only(AppointmentStatus),
}

impl StatusFilter {
    /// Whether an appointment with `status` passes the filter
    #[must_use]
    pub fn admits(self, status: AppointmentStatus) -> bool {
        match self {
            Self::Active => !status.is_terminal(),
            Self::Only(wanted) => status == wanted,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = salon_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::Active),
            other => other.parse().map(Self::Only),
        }
    }
}

/// The reference instant of one triage run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    today: NaiveDate,
    minute_of_day: u32,
    offset: FixedOffset,
}

impl Now {
    /// Capture `instant` in its own local offset
    #[must_use]
    pub fn capture(instant: DateTime<FixedOffset>) -> Self {
        Self {
            today: instant.date_naive(),
            minute_of_day: instant.hour() * 60 + instant.minute(),
            offset: *instant.offset(),
        }
    }

    /// Local calendar date
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Local minutes since midnight
    #[must_use]
    pub const fn minute_of_day(&self) -> u32 {
        self.minute_of_day
    }

    /// Whether the appointment was booked on the local calendar day of `self`
    #[must_use]
    pub fn booked_today(&self, appointment: &Appointment) -> bool {
        appointment
            .created_at
            .is_some_and(|created| utils::local_date(&created, &self.offset) == self.today)
    }

    /// Whether the appointment is still pending although its slot today has passed
    ///
    /// Appointments scheduled on another day, or with an unreadable time, are
    /// never overdue.
    #[must_use]
    pub fn is_overdue(&self, appointment: &Appointment) -> bool {
        appointment.status.is_pending()
            && appointment.appointment_date == self.today
            && appointment
                .scheduled_minutes()
                .is_some_and(|minutes| minutes < self.minute_of_day)
    }
}

impl From<DateTime<FixedOffset>> for Now {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::capture(instant)
    }
}

/// Flags derived for one appointment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Flags {
    /// Booked today
    pub is_new: bool,
    /// Slot has passed while still booked or confirmed
    pub needs_attention: bool,
}

/// Derive the flags of `appointment` against `now`
#[must_use]
pub fn annotate(appointment: &Appointment, now: &Now) -> Flags {
    Flags {
        is_new: now.booked_today(appointment),
        needs_attention: now.is_overdue(appointment),
    }
}

/// Position of the scheduled time in the ordering; unreadable times go last
///
/// Seconds take part in the comparison, so `09:00:01` sorts before
/// `09:00:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScheduleKey {
    /// Scheduled time of day
    At(NaiveTime),
    /// The time could not be parsed
    Unscheduled,
}

impl ScheduleKey {
    /// Key of an appointment's scheduled time
    #[must_use]
    pub fn of(appointment: &Appointment) -> Self {
        appointment.time_of_day().map_or(Self::Unscheduled, Self::At)
    }
}

/// Sort key of the priority list, compared field by field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityKey {
    /// New bookings first
    pub is_new: Reverse<bool>,
    /// Overdue appointments next
    pub needs_attention: Reverse<bool>,
    /// Then by status urgency
    pub urgency: u8,
    /// Then by scheduled time
    pub schedule: ScheduleKey,
}

/// An appointment together with its derived flags
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotatedAppointment<'a> {
    /// The untouched backend record
    pub appointment: &'a Appointment,
    /// Derived flags
    #[serde(flatten)]
    pub flags: Flags,
}

impl AnnotatedAppointment<'_> {
    /// Sort key of this entry
    #[must_use]
    pub fn priority_key(&self) -> PriorityKey {
        PriorityKey {
            is_new: Reverse(self.flags.is_new),
            needs_attention: Reverse(self.flags.needs_attention),
            urgency: self.appointment.status.urgency_rank(),
            schedule: ScheduleKey::of(self.appointment),
        }
    }

    /// Detach the entry from the borrowed list
    #[must_use]
    pub fn to_owned_entry(&self) -> TriagedAppointment {
        TriagedAppointment {
            appointment: self.appointment.clone(),
            flags: self.flags,
        }
    }
}

/// Owned counterpart of [`AnnotatedAppointment`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriagedAppointment {
    /// Copy of the backend record
    pub appointment: Appointment,
    /// Derived flags
    #[serde(flatten)]
    pub flags: Flags,
}

/// Result of a triage run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriageOutcome<'a> {
    /// Filtered appointments in priority order
    pub filtered: Vec<AnnotatedAppointment<'a>>,
    /// Counts over the whole unfiltered list
    pub counts: StatusCounts,
}

impl TriageOutcome<'_> {
    /// Number of appointments across all statuses
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Count for one status, zero when absent
    #[must_use]
    pub fn count(&self, status: AppointmentStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

/// Count appointments per status in one pass
#[must_use]
pub fn status_counts(appointments: &[Appointment]) -> StatusCounts {
    appointments
        .iter()
        .fold(StatusCounts::new(), |mut counts, appointment| {
            *counts.entry(appointment.status).or_insert(0) += 1;
            counts
        })
}

/// Triage a day's appointments against `now`
///
/// Counts cover the full list whatever the filter. The filtered entries are
/// ordered by [`PriorityKey`] with a stable sort, so equal keys keep their
/// input order.
#[must_use]
pub fn triage(
    appointments: &[Appointment],
    now: DateTime<FixedOffset>,
    filter: StatusFilter,
) -> TriageOutcome<'_> {
    let now = Now::capture(now);
    let counts = status_counts(appointments);

    let mut filtered: Vec<_> = appointments
        .iter()
        .filter(|appointment| filter.admits(appointment.status))
        .map(|appointment| AnnotatedAppointment {
            appointment,
            flags: annotate(appointment, &now),
        })
        .collect();

    filtered.sort_by_cached_key(AnnotatedAppointment::priority_key);

    debug!(
        total = appointments.len(),
        shown = filtered.len(),
        filter = %filter,
        today = %now.today(),
        "Triaged appointments"
    );

    TriageOutcome { filtered, counts }
}
