//! Statistics shown on the dashboard
//!
//! Both charts are derived locally: the status chart from per-status totals
//! and the trend line from a window of appointments.

use chrono::NaiveDate;
use salon_core::{Appointment, AppointmentStatus};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::triage::StatusCounts;

/// One slice of the status chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StatusSlice {
    /// Status of the slice
    pub status: AppointmentStatus,
    /// Human label
    pub label: &'static str,
    /// Number of appointments
    pub value: usize,
}

/// Appointments per status across the whole backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StatusTotals {
    /// Booked
    pub booked: usize,
    /// Confirmed
    pub confirmed: usize,
    /// Completed
    pub completed: usize,
    /// Cancelled
    pub cancelled: usize,
    /// No-show
    pub no_show: usize,
    /// Sum of the five
    pub total: usize,
}

impl StatusTotals {
    /// Build from `(status, count)` pairs, summing repeats
    ///
    /// Unknown statuses are not part of the totals.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (AppointmentStatus, usize)>,
    {
        let mut totals = Self::default();
        for (status, count) in pairs {
            let slot = match status {
                AppointmentStatus::Booked => &mut totals.booked,
                AppointmentStatus::Confirmed => &mut totals.confirmed,
                AppointmentStatus::Completed => &mut totals.completed,
                AppointmentStatus::Cancelled => &mut totals.cancelled,
                AppointmentStatus::NoShow => &mut totals.no_show,
                AppointmentStatus::Unknown => continue,
            };
            *slot += count;
            totals.total += count;
        }
        totals
    }

    /// Count for one status
    #[must_use]
    pub const fn get(&self, status: AppointmentStatus) -> usize {
        match status {
            AppointmentStatus::Booked => self.booked,
            AppointmentStatus::Confirmed => self.confirmed,
            AppointmentStatus::Completed => self.completed,
            AppointmentStatus::Cancelled => self.cancelled,
            AppointmentStatus::NoShow => self.no_show,
            AppointmentStatus::Unknown => 0,
        }
    }

    /// The totals as a status histogram, zero entries omitted
    #[must_use]
    pub fn to_counts(&self) -> StatusCounts {
        AppointmentStatus::KNOWN
            .into_iter()
            .map(|status| (status, self.get(status)))
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

impl From<&StatusCounts> for StatusTotals {
    fn from(counts: &StatusCounts) -> Self {
        Self::from_pairs(counts.iter().map(|(&status, &count)| (status, count)))
    }
}

/// Slices for the status chart, in lifecycle order
///
/// Statuses with no appointments are dropped, as is the unknown bucket.
#[must_use]
pub fn status_breakdown(counts: &StatusCounts) -> Vec<StatusSlice> {
    AppointmentStatus::KNOWN
        .into_iter()
        .filter_map(|status| {
            let value = counts.get(&status).copied().unwrap_or(0);
            (value > 0).then_some(StatusSlice {
                status,
                label: status.label(),
                value,
            })
        })
        .collect()
}

/// Appointments scheduled on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TrendPoint {
    /// Scheduled date
    pub date: NaiveDate,
    /// Number of appointments on that date
    pub appointments: usize,
}

/// Appointments per date, ascending, keeping the last `limit` dates
///
/// Dates without appointments do not appear.
#[must_use]
pub fn daily_trend(appointments: &[Appointment], limit: usize) -> Vec<TrendPoint> {
    let per_date = appointments
        .iter()
        .fold(BTreeMap::<NaiveDate, usize>::new(), |mut acc, appointment| {
            *acc.entry(appointment.appointment_date).or_insert(0) += 1;
            acc
        });

    let skip = per_date.len().saturating_sub(limit);
    per_date
        .into_iter()
        .skip(skip)
        .map(|(date, appointments)| TrendPoint { date, appointments })
        .collect()
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::triage::status_counts;
    use pretty_assertions::assert_eq;

    fn on(date: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            status,
            appointment_date: date.parse().unwrap(),
            ..Appointment::default()
        }
    }

    #[test]
    fn test_breakdown_drops_empty_slices() {
        let list = vec![
            on("2024-03-15", AppointmentStatus::NoShow),
            on("2024-03-15", AppointmentStatus::Booked),
            on("2024-03-15", AppointmentStatus::Booked),
            on("2024-03-15", AppointmentStatus::Unknown),
        ];

        let slices = status_breakdown(&status_counts(&list));

        assert_eq!(
            slices,
            vec![
                StatusSlice {
                    status: AppointmentStatus::Booked,
                    label: "Booked",
                    value: 2,
                },
                StatusSlice {
                    status: AppointmentStatus::NoShow,
                    label: "No Show",
                    value: 1,
                },
            ]
        );
        assert!(status_breakdown(&StatusCounts::new()).is_empty());
    }

    #[test]
    fn test_totals_from_pairs() {
        let totals = StatusTotals::from_pairs([
            (AppointmentStatus::Booked, 4),
            (AppointmentStatus::Confirmed, 3),
            (AppointmentStatus::Completed, 10),
            (AppointmentStatus::Cancelled, 0),
            (AppointmentStatus::NoShow, 1),
            (AppointmentStatus::Unknown, 7),
        ]);

        assert_eq!(totals.total, 18);
        assert_eq!(totals.get(AppointmentStatus::Completed), 10);
        assert_eq!(totals.get(AppointmentStatus::Unknown), 0);

        let counts = totals.to_counts();
        assert_eq!(counts.len(), 4);
        assert!(!counts.contains_key(&AppointmentStatus::Cancelled));
        assert_eq!(StatusTotals::from(&counts), totals);
    }

    #[test]
    fn test_trend_keeps_last_dates() {
        let list = vec![
            on("2024-03-03", AppointmentStatus::Booked),
            on("2024-03-01", AppointmentStatus::Booked),
            on("2024-03-02", AppointmentStatus::Completed),
            on("2024-03-03", AppointmentStatus::Cancelled),
            on("2024-03-01", AppointmentStatus::Booked),
        ];

        let trend = daily_trend(&list, 2);

        assert_eq!(
            trend,
            vec![
                TrendPoint {
                    date: "2024-03-02".parse().unwrap(),
                    appointments: 1,
                },
                TrendPoint {
                    date: "2024-03-03".parse().unwrap(),
                    appointments: 2,
                },
            ]
        );
        assert_eq!(daily_trend(&list, 14).len(), 3);
        assert!(daily_trend(&list, 0).is_empty());
        assert!(daily_trend(&[], 14).is_empty());
    }
}
