//! Client for the Central Portal publisher API.
//!
//! [`publisher::CentralPublisher`] performs the HTTP calls with headers from
//! [`auth`]. [`poll`] drives a deployment to a terminal state and [`snapshot`]
//! sends snapshot versions to a Maven repository.

pub mod auth;
pub mod config;
pub mod error;
pub mod poll;
pub mod publisher;
pub mod snapshot;
pub mod uri;

pub use auth::Authentication;
pub use config::PublisherConfig;
pub use error::{ClientError, TransportError};
pub use poll::{poll_until_terminal, PollError, PollOptions};
pub use publisher::{CentralPublisher, Publisher, StatusSource};
pub use snapshot::SnapshotRepository;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("centralpub/", env!("CARGO_PKG_VERSION"));
