//! Appointment triage and dashboard logic for Salon Desk
//!
//! Everything here is synchronous and free of I/O. Functions take the
//! appointment list and the current instant as arguments, so a caller that
//! fixes "now" gets reproducible results.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod categorize;
pub mod insights;
pub mod summary;
pub mod triage;

pub use categorize::{Categorized, Tab, categorize};
pub use insights::{StatusSlice, StatusTotals, TrendPoint, daily_trend, status_breakdown};
pub use summary::{DailySummary, summarize};
pub use triage::{
    AnnotatedAppointment, Flags, Now, StatusCounts, StatusFilter, TriageOutcome,
    TriagedAppointment, status_counts, triage,
};
