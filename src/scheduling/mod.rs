//! The availability and booking engine: slot generation, conflict
//! resolution, the commit protocol, and cancellation.

pub mod cancel;
pub mod conflict;
pub mod coordinator;
pub mod slots;
pub mod store;

pub use cancel::CancellationHandler;
pub use coordinator::BookingCoordinator;
pub use slots::CandidateSlot;
pub use store::BookingStore;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed or inconsistent input (duration mismatch, rule says
    /// unavailable). Surfaced verbatim, never retried.
    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),

    /// The interval was taken between listing and commit. Recoverable:
    /// the caller should refresh the candidate list.
    #[error("The requested slot is no longer available")]
    Conflict,

    #[error("Host not found")]
    HostNotFound,

    #[error("Event type not found")]
    EventTypeNotFound,

    /// Meeting-provider degradation. Never fails a committed booking; only
    /// reported by the link-attachment task.
    #[error("Meeting provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Storage error: {0}")]
    Store(DatabaseError),
}

#[derive(Debug, Error)]
pub enum CancellationError {
    #[error("Booking not found")]
    NotFound,

    #[error("Only the host who owns the booking may cancel it")]
    AuthorizationDenied,

    #[error("Storage error: {0}")]
    Store(DatabaseError),
}
