//! Upcoming / past split of an appointment list

use chrono::NaiveDate;
use salon_core::Appointment;
use serde::Serialize;
use std::cmp::Ordering;

use crate::triage::ScheduleKey;

/// Tab of the appointments page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// After today and not yet resolved
    #[default]
    Upcoming,
    /// Before today
    Past,
}

/// An appointment list split into the two tabs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Categorized<'a> {
    /// Soonest first
    pub upcoming: Vec<&'a Appointment>,
    /// Most recent first
    pub past: Vec<&'a Appointment>,
}

impl<'a> Categorized<'a> {
    /// Entries shown on `tab`
    #[must_use]
    pub fn tab(&self, tab: Tab) -> &[&'a Appointment] {
        match tab {
            Tab::Upcoming => &self.upcoming,
            Tab::Past => &self.past,
        }
    }

    /// Number of entries across both tabs
    #[must_use]
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    /// Whether both tabs are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

/// Tab an appointment belongs to, if any
///
/// Today's appointments belong to neither tab; they live on the triage
/// list. Upcoming admits later dates that are not yet resolved, so a
/// future appointment that was already cancelled is hidden. Past admits
/// earlier dates whatever their status.
#[must_use]
pub fn tab_of(appointment: &Appointment, today: NaiveDate) -> Option<Tab> {
    match appointment.appointment_date.cmp(&today) {
        Ordering::Greater if !appointment.status.is_terminal() => Some(Tab::Upcoming),
        Ordering::Less => Some(Tab::Past),
        _ => None,
    }
}

fn chronological(a: &Appointment, b: &Appointment) -> Ordering {
    a.appointment_date
        .cmp(&b.appointment_date)
        .then_with(|| ScheduleKey::of(a).cmp(&ScheduleKey::of(b)))
}

fn reverse_chronological(a: &Appointment, b: &Appointment) -> Ordering {
    b.appointment_date
        .cmp(&a.appointment_date)
        .then_with(|| match (ScheduleKey::of(a), ScheduleKey::of(b)) {
            (ScheduleKey::At(x), ScheduleKey::At(y)) => y.cmp(&x),
            (left, right) => left.cmp(&right),
        })
}

/// Filter by `search_term` and split into upcoming and past
///
/// The search is a case-insensitive substring match on client name, client
/// email and service name; an empty term keeps everything. See [`tab_of`]
/// for which appointments land where. Within one date, unreadable times
/// sort after readable ones in both tabs.
#[must_use]
pub fn categorize<'a>(
    appointments: &'a [Appointment],
    today: NaiveDate,
    search_term: &str,
) -> Categorized<'a> {
    let mut split = Categorized::default();
    for appointment in appointments
        .iter()
        .filter(|appointment| appointment.matches_search(search_term))
    {
        match tab_of(appointment, today) {
            Some(Tab::Upcoming) => split.upcoming.push(appointment),
            Some(Tab::Past) => split.past.push(appointment),
            None => {}
        }
    }

    split.upcoming.sort_by(|a, b| chronological(a, b));
    split.past.sort_by(|a, b| reverse_chronological(a, b));
    split
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use salon_core::AppointmentStatus;
    use salon_core::types::ServiceDetails;

    fn appointment(id: i64, status: AppointmentStatus, date: &str, time: &str) -> Appointment {
        Appointment {
            id,
            status,
            appointment_date: date.parse().unwrap(),
            appointment_time: time.to_string(),
            ..Appointment::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn ids(list: &[&Appointment]) -> Vec<i64> {
        list.iter().map(|a| a.id).collect()
    }

    #[rstest]
    #[case(AppointmentStatus::Booked, "2024-03-16", Some(Tab::Upcoming))]
    #[case(AppointmentStatus::Confirmed, "2024-04-01", Some(Tab::Upcoming))]
    #[case(AppointmentStatus::Unknown, "2024-04-01", Some(Tab::Upcoming))]
    #[case(AppointmentStatus::Cancelled, "2024-04-01", None)]
    #[case(AppointmentStatus::Booked, "2024-03-15", None)]
    #[case(AppointmentStatus::Completed, "2024-03-15", None)]
    #[case(AppointmentStatus::Booked, "2024-03-14", Some(Tab::Past))]
    #[case(AppointmentStatus::NoShow, "2023-12-01", Some(Tab::Past))]
    fn test_tab_of(
        #[case] status: AppointmentStatus,
        #[case] date: &str,
        #[case] tab: Option<Tab>,
    ) {
        assert_eq!(tab_of(&appointment(1, status, date, "10:00"), today()), tab);
    }

    #[test]
    fn test_split_and_ordering() {
        let list = vec![
            appointment(1, AppointmentStatus::Booked, "2024-03-20", "09:00"),
            appointment(2, AppointmentStatus::Confirmed, "2024-03-16", "15:00"),
            appointment(3, AppointmentStatus::Booked, "2024-03-16", "11:00"),
            appointment(4, AppointmentStatus::Completed, "2024-03-10", "10:00"),
            appointment(5, AppointmentStatus::Booked, "2024-03-12", "09:00"),
            appointment(6, AppointmentStatus::NoShow, "2024-03-12", "16:00"),
            appointment(7, AppointmentStatus::Booked, "2024-03-15", "12:00"),
            appointment(8, AppointmentStatus::Cancelled, "2024-03-18", "12:00"),
        ];

        let split = categorize(&list, today(), "");

        assert_eq!(ids(&split.upcoming), vec![3, 2, 1]);
        assert_eq!(ids(&split.past), vec![6, 5, 4]);
        assert_eq!(split.len(), 6);
        assert_eq!(ids(split.tab(Tab::Past)), vec![6, 5, 4]);
    }

    #[test]
    fn test_seconds_order_both_tabs() {
        let list = vec![
            appointment(1, AppointmentStatus::Booked, "2024-03-16", "09:00:59"),
            appointment(2, AppointmentStatus::Booked, "2024-03-16", "09:00:01"),
            appointment(3, AppointmentStatus::Completed, "2024-03-10", "09:00:01"),
            appointment(4, AppointmentStatus::Completed, "2024-03-10", "09:00:59"),
        ];

        let split = categorize(&list, today(), "");

        assert_eq!(ids(&split.upcoming), vec![2, 1]);
        assert_eq!(ids(&split.past), vec![4, 3]);
    }

    #[test]
    fn test_unreadable_times_go_last_within_a_date() {
        let list = vec![
            appointment(1, AppointmentStatus::Booked, "2024-03-16", "later"),
            appointment(2, AppointmentStatus::Booked, "2024-03-16", "10:00"),
            appointment(3, AppointmentStatus::Completed, "2024-03-10", ""),
            appointment(4, AppointmentStatus::Completed, "2024-03-10", "08:00"),
        ];

        let split = categorize(&list, today(), "");

        assert_eq!(ids(&split.upcoming), vec![2, 1]);
        assert_eq!(ids(&split.past), vec![4, 3]);
    }

    #[test]
    fn test_search_filters_before_split() {
        let mut zara = appointment(1, AppointmentStatus::Booked, "2024-03-20", "09:00");
        zara.client_name = "Zara Khan".to_string();
        let mut color = appointment(2, AppointmentStatus::Completed, "2024-03-01", "09:00");
        color.service_details = ServiceDetails {
            name: "Hair Colour".to_string(),
            ..ServiceDetails::default()
        };
        let mut john = appointment(3, AppointmentStatus::Booked, "2024-03-20", "10:00");
        john.client_name = "John".to_string();
        let list = vec![zara, color, john];

        let by_name = categorize(&list, today(), "zara");
        assert_eq!(ids(&by_name.upcoming), vec![1]);
        assert!(by_name.past.is_empty());

        let by_service = categorize(&list, today(), "COLOUR");
        assert!(by_service.upcoming.is_empty());
        assert_eq!(ids(&by_service.past), vec![2]);

        assert_eq!(categorize(&list, today(), "   ").len(), 3);
        assert!(categorize(&list, today(), "nobody").is_empty());
    }

    #[test]
    fn test_empty_input() {
        let split = categorize(&[], today(), "anything");
        assert!(split.is_empty());
        assert_eq!(split, Categorized::default());
    }
}
