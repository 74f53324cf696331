//! Async client for the salon booking backend
//!
//! [`ApiClient`] wraps the REST endpoints and keeps the operator signed in
//! through a shared [`Session`]. [`TriageFeed`] polls today's appointments
//! and publishes triaged snapshots for a dashboard to render; [`Poller`]
//! keeps the other dashboard resources fresh on their own intervals.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod appointments;
pub mod client;
pub mod error;
pub mod feed;
pub mod poll;
pub mod session;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use feed::{Clock, FixedClock, SnapshotReceiver, SystemClock, TriageFeed, TriageSnapshot};
pub use poll::{Latest, Poller};
pub use session::Session;
