//! Core data types for Salon Desk
//!
//! Appointments are owned by the backend; this crate only reads them. Field
//! names follow the backend's JSON so the types deserialize straight from
//! API responses.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use validator::Validate;

use crate::utils::{self, amount};

/// Backend identifier type
pub type RecordId = i64;

/// Appointment lifecycle status
///
/// `booked -> confirmed -> completed`, with `cancelled` and `no_show` as the
/// two failure exits. Any status string this client does not know about is
/// kept as [`AppointmentStatus::Unknown`] instead of failing the whole list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked by the client, awaiting confirmation
    #[default]
    Booked,
    /// Confirmed by the salon
    Confirmed,
    /// Service delivered
    Completed,
    /// Cancelled by either side
    Cancelled,
    /// Client did not show up
    NoShow,
    /// Status not recognised by this client
    Unknown,
}

impl AppointmentStatus {
    /// The five statuses the backend defines, in lifecycle order
    pub const KNOWN: [Self; 5] = [
        Self::Booked,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
            Self::Unknown => "unknown",
        }
    }

    /// Human label used on the dashboard
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Booked => "Booked",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "No Show",
            Self::Unknown => "Other",
        }
    }

    /// No further lifecycle transition happens from this status
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// The appointment is still waiting to be served
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Booked | Self::Confirmed)
    }

    /// Priority used when ordering today's list, lower is more urgent
    #[must_use]
    pub const fn urgency_rank(self) -> u8 {
        match self {
            Self::Booked => 1,
            Self::Confirmed => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
            Self::NoShow => 5,
            Self::Unknown => 6,
        }
    }

    /// Lenient conversion used for backend payloads
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "booked" => Ok(Self::Booked),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(crate::Error::InvalidValue {
                kind: "appointment status",
                value: other.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// Payment status, an axis independent from the lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid yet
    #[default]
    Pending,
    /// Paid in full
    Paid,
    /// Payment returned to the client
    Refunded,
    /// Status not recognised by this client
    Unknown,
}

impl PaymentStatus {
    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "refunded" => Self::Refunded,
            _ => Self::Unknown,
        })
    }
}

/// Service embedded in an appointment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetails {
    /// Service identifier
    #[serde(default)]
    pub id: RecordId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Price
    #[serde(default, with = "amount")]
    pub price: f64,
    /// Length of the service
    #[serde(default)]
    pub duration_minutes: u32,
    /// Service category, e.g. `hair` or `lashes`
    #[serde(default)]
    pub category: String,
    /// Deposit required at booking time
    #[serde(default, with = "amount")]
    pub deposit_amount: f64,
    /// Whether a deposit is required
    #[serde(default)]
    pub requires_deposit: bool,
}

/// Payment figures computed by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// A refund may still be issued
    #[serde(default)]
    pub can_be_refunded: bool,
    /// Deposit received
    #[serde(default)]
    pub has_deposit_paid: bool,
    /// Nothing left to pay
    #[serde(default)]
    pub is_fully_paid: bool,
    /// Amount still owed
    #[serde(default, with = "amount")]
    pub remaining_balance: f64,
    /// Amount received so far
    #[serde(default, with = "amount")]
    pub total_paid: f64,
}

/// An appointment as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Appointment identifier
    pub id: RecordId,

    /// Client name
    #[serde(default)]
    pub client_name: String,
    /// Client email
    #[serde(default)]
    pub client_email: String,
    /// Client phone
    #[serde(default)]
    pub client_phone: String,

    /// Booked service identifier
    #[serde(default)]
    pub service: RecordId,
    /// Booked service details
    #[serde(default)]
    pub service_details: ServiceDetails,
    /// Assigned stylist, if any
    #[serde(default)]
    pub stylist: Option<RecordId>,

    /// Scheduled calendar date
    pub appointment_date: NaiveDate,
    /// Scheduled local time of day, `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub appointment_time: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: AppointmentStatus,
    /// Payment status
    #[serde(default)]
    pub payment_status: PaymentStatus,

    /// When the booking was made
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// Last modification
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,

    /// Length of the appointment
    #[serde(default)]
    pub duration_minutes: u32,
    /// Total price
    #[serde(default, with = "amount")]
    pub total_amount: f64,
    /// Deposit amount
    #[serde(default, with = "amount")]
    pub deposit_amount: f64,
    /// Backend allows cancellation
    #[serde(default)]
    pub can_cancel: bool,
    /// Backend considers the appointment past due
    #[serde(default)]
    pub is_past_due: bool,
    /// Payment figures
    #[serde(default)]
    pub payment_summary: Option<PaymentSummary>,
}

impl Appointment {
    /// Scheduled time of day, if the backend sent a parseable value
    #[must_use]
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        utils::parse_time_of_day(&self.appointment_time).ok()
    }

    /// Scheduled time as minutes since midnight
    #[must_use]
    pub fn scheduled_minutes(&self) -> Option<u32> {
        self.time_of_day().map(utils::minutes_since_midnight)
    }

    /// Case-insensitive match on client name, client email or service name
    ///
    /// An empty or whitespace-only term matches everything. Any other term
    /// is matched as typed, surrounding spaces included.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        if term.trim().is_empty() {
            return true;
        }
        [
            self.client_name.as_str(),
            self.client_email.as_str(),
            self.service_details.name.as_str(),
        ]
        .into_iter()
        .any(|field| utils::contains_ignore_case(field, term))
    }
}

/// Paginated list envelope used by every list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching records across all pages
    #[serde(default)]
    pub count: u64,
    /// URL of the next page
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page
    #[serde(default)]
    pub previous: Option<String>,
    /// Records on this page
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

/// Query filters for the appointment list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentFilters {
    /// Lifecycle status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    /// Payment status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    /// Exact scheduled date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,
    /// Service identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<RecordId>,
    /// Stylist identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylist: Option<RecordId>,
    /// Server-side search over client name and email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Page number, 1-based
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl AppointmentFilters {
    /// Filters matching a single status
    #[must_use]
    pub fn with_status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Filters matching a single scheduled date
    #[must_use]
    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            appointment_date: Some(date),
            ..Self::default()
        }
    }
}

/// Inclusive range of scheduled dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First date included
    #[serde(rename = "appointment_date__gte")]
    pub start: NaiveDate,
    /// Last date included
    #[serde(rename = "appointment_date__lte")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting an end before the start
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] when `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> crate::Result<Self> {
        if end < start {
            return Err(crate::Error::Validation {
                field: "date_range".to_string(),
                message: format!("end {end} is before start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// From `days` days before `end` through `end`, both ends included
    #[must_use]
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let start = end - chrono::Days::new(u64::from(days));
        Self { start, end }
    }
}

/// Payload for creating an appointment
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewAppointment {
    /// Client name
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub client_name: String,
    /// Client email
    #[validate(email(message = "Invalid email"))]
    pub client_email: String,
    /// Client phone
    #[validate(length(min = 1, max = 32, message = "Client phone is required"))]
    pub client_phone: String,
    /// Service identifier
    pub service: RecordId,
    /// Stylist identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylist: Option<RecordId>,
    /// Scheduled date
    pub appointment_date: NaiveDate,
    /// Scheduled time, sent as `HH:MM`
    #[serde(serialize_with = "serialize_hhmm")]
    pub appointment_time: NaiveTime,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for updating an appointment; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateAppointment {
    /// New scheduled date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,
    /// New scheduled time
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_hhmm"
    )]
    pub appointment_time: Option<NaiveTime>,
    /// New notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// New lifecycle status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    /// New payment status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

fn serialize_hhmm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M"))
}

#[allow(clippy::ref_option)]
fn serialize_opt_hhmm<S: Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serialize_hhmm(time, serializer),
        None => serializer.serialize_none(),
    }
}

/// Lifecycle actions exposed as dedicated backend endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusAction {
    /// `booked -> confirmed`
    Confirm,
    /// Any non-terminal status to `cancelled`
    Cancel,
    /// `confirmed -> completed`
    MarkCompleted,
    /// Any non-terminal status to `no_show`
    MarkNoShow,
}

impl StatusAction {
    /// Path segment of the action endpoint
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::MarkCompleted => "mark_completed",
            Self::MarkNoShow => "mark_no_show",
        }
    }

    /// Status the appointment ends up in after the action
    #[must_use]
    pub const fn resulting_status(self) -> AppointmentStatus {
        match self {
            Self::Confirm => AppointmentStatus::Confirmed,
            Self::Cancel => AppointmentStatus::Cancelled,
            Self::MarkCompleted => AppointmentStatus::Completed,
            Self::MarkNoShow => AppointmentStatus::NoShow,
        }
    }
}

/// Response of the lifecycle action endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionResponse {
    /// The appointment after the action
    pub appointment: Appointment,
    /// Optional confirmation message
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the payment status probe
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentStatusCheck {
    /// Current payment status
    pub payment_status: PaymentStatus,
    /// Nothing left to pay
    #[serde(default)]
    pub is_fully_paid: bool,
    /// Amount still owed
    #[serde(default, with = "amount")]
    pub remaining_balance: f64,
    /// Date of the next payment, if scheduled
    #[serde(default)]
    pub next_payment_due: Option<String>,
}

/// Credentials for the token endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Validate)]
pub struct LoginRequest {
    /// Account email
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    /// Account password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// JWT pair issued on login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token
    pub access: String,
    /// Long-lived refresh token
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Access token issued by the refresh endpoint
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    /// New access token
    pub access: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken").finish_non_exhaustive()
    }
}
