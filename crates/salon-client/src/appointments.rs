//! Appointment endpoints

use chrono::{DateTime, FixedOffset, NaiveDate};
use futures::future::try_join_all;
use salon_core::{
    Appointment, AppointmentStatus, Page, RecordId,
    config::DashboardConfig,
    types::{
        ActionResponse, AppointmentFilters, DateRange, NewAppointment, PaymentStatusCheck,
        PaymentSummary, StatusAction, UpdateAppointment,
    },
};
use salon_triage::{StatusFilter, StatusTotals, TrendPoint, daily_trend};
use std::collections::HashSet;
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    client::ApiClient,
    error::ClientResult,
    feed::TriageSnapshot,
};

const APPOINTMENTS_PATH: &str = "/appointments/";

fn appointment_path(id: RecordId) -> String {
    format!("{APPOINTMENTS_PATH}{id}/")
}

impl ApiClient {
    /// List one page of appointments
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> ClientResult<Page<Appointment>> {
        let url = self.url(APPOINTMENTS_PATH);
        self.execute(|| self.http().get(&url).query(filters)).await
    }

    /// List every appointment matching `filters`, following `next` links
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn list_all_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> ClientResult<Vec<Appointment>> {
        let first = self.list_appointments(filters).await?;
        self.collect_pages(first).await
    }

    async fn collect_pages(&self, first: Page<Appointment>) -> ClientResult<Vec<Appointment>> {
        let mut appointments = first.results;
        let mut next = first.next;
        let mut visited = HashSet::new();

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!(url = %url, "Pagination loops back on itself, stopping");
                break;
            }
            let page: Page<Appointment> = self.execute(|| self.http().get(&url)).await?;
            appointments.extend(page.results);
            next = page.next;
        }

        debug!(
            count = appointments.len(),
            pages = visited.len() + 1,
            "Collected appointment pages"
        );
        Ok(appointments)
    }

    /// List one page of appointments scheduled within `range`
    ///
    /// Any exact-date filter in `filters` is ignored in favour of the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn appointments_in_range(
        &self,
        range: &DateRange,
        filters: &AppointmentFilters,
    ) -> ClientResult<Page<Appointment>> {
        let filters = AppointmentFilters {
            appointment_date: None,
            ..filters.clone()
        };
        let url = self.url(APPOINTMENTS_PATH);
        self.execute(|| self.http().get(&url).query(range).query(&filters))
            .await
    }

    /// Every appointment scheduled on `today`
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn todays_appointments(&self, today: NaiveDate) -> ClientResult<Vec<Appointment>> {
        self.list_all_appointments(&AppointmentFilters::on_date(today))
            .await
    }

    /// Server-side search over client name and email
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn search_appointments(&self, term: &str) -> ClientResult<Page<Appointment>> {
        let filters = AppointmentFilters {
            search: Some(term.to_string()),
            ..AppointmentFilters::default()
        };
        self.list_appointments(&filters).await
    }

    /// Fetch one appointment
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::NotFound`] for an unknown id.
    pub async fn appointment(&self, id: RecordId) -> ClientResult<Appointment> {
        let url = self.url(&appointment_path(id));
        self.execute(|| self.http().get(&url)).await
    }

    /// Create an appointment
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Validation`] without sending anything if
    /// the payload is invalid, or the backend error otherwise.
    pub async fn create_appointment(&self, new: &NewAppointment) -> ClientResult<Appointment> {
        new.validate()?;
        let url = self.url(APPOINTMENTS_PATH);
        self.execute(|| self.http().post(&url).json(new)).await
    }

    /// Replace the editable fields of an appointment
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn update_appointment(
        &self,
        id: RecordId,
        update: &UpdateAppointment,
    ) -> ClientResult<Appointment> {
        let url = self.url(&appointment_path(id));
        self.execute(|| self.http().put(&url).json(update)).await
    }

    /// Apply a lifecycle action
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    pub async fn apply_action(
        &self,
        id: RecordId,
        action: StatusAction,
    ) -> ClientResult<ActionResponse> {
        let url = self.url(&format!(
            "{}{}/",
            appointment_path(id),
            action.path_segment()
        ));
        let response: ActionResponse = self.execute(|| self.http().post(&url)).await?;
        debug!(
            appointment_id = id,
            action = action.path_segment(),
            status = %response.appointment.status,
            "Applied appointment action"
        );
        Ok(response)
    }

    /// Payment figures of an appointment
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn payment_summary(&self, id: RecordId) -> ClientResult<PaymentSummary> {
        let url = self.url(&format!("{}payment_summary/", appointment_path(id)));
        self.execute(|| self.http().get(&url)).await
    }

    /// Current payment status of an appointment
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn check_payment_status(&self, id: RecordId) -> ClientResult<PaymentStatusCheck> {
        let url = self.url(&format!("{}check_payment_status/", appointment_path(id)));
        self.execute(|| self.http().get(&url)).await
    }

    /// Upcoming appointments of the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn upcoming_for_current_user(&self) -> ClientResult<Vec<Appointment>> {
        let url = self.url(&format!("{APPOINTMENTS_PATH}my_upcoming/"));
        self.execute(|| self.http().get(&url)).await
    }

    /// Appointments with an outstanding payment
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn payment_pending(&self) -> ClientResult<Vec<Appointment>> {
        let url = self.url(&format!("{APPOINTMENTS_PATH}payment_pending/"));
        self.execute(|| self.http().get(&url)).await
    }

    /// Per-status totals across the whole backend
    ///
    /// Issues one filtered list request per lifecycle status concurrently
    /// and reads each page's `count`.
    ///
    /// # Errors
    ///
    /// Fails if any of the requests fails.
    pub async fn status_totals(&self) -> ClientResult<StatusTotals> {
        let counts = try_join_all(AppointmentStatus::KNOWN.into_iter().map(|status| async move {
            let page = self
                .list_appointments(&AppointmentFilters::with_status(status))
                .await?;
            Ok::<_, crate::ClientError>((status, usize::try_from(page.count).unwrap_or(usize::MAX)))
        }))
        .await?;

        Ok(StatusTotals::from_pairs(counts))
    }

    /// Appointments per date over the `window_days` before `today`
    ///
    /// Keeps the last `limit` dates that have appointments.
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn appointment_trend(
        &self,
        today: NaiveDate,
        window_days: u32,
        limit: usize,
    ) -> ClientResult<Vec<TrendPoint>> {
        let range = DateRange::trailing(today, window_days);
        let first = self
            .appointments_in_range(&range, &AppointmentFilters::default())
            .await?;
        let appointments = self.collect_pages(first).await?;
        Ok(daily_trend(&appointments, limit))
    }

    /// Appointment trend using the dashboard's configured window and length
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn dashboard_trend(
        &self,
        today: NaiveDate,
        dashboard: &DashboardConfig,
    ) -> ClientResult<Vec<TrendPoint>> {
        self.appointment_trend(today, dashboard.trend_window_days, dashboard.trend_days)
            .await
    }

    /// Fetch today's appointments and triage them against `now`
    ///
    /// "Today" is the calendar date of `now` in its own offset.
    ///
    /// # Errors
    ///
    /// Fails if fetching the list fails.
    pub async fn triage_today(
        &self,
        now: DateTime<FixedOffset>,
        filter: StatusFilter,
    ) -> ClientResult<TriageSnapshot> {
        let appointments = self.todays_appointments(now.date_naive()).await?;
        Ok(TriageSnapshot::compute(&appointments, now, filter))
    }
}
