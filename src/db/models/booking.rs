use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A committed reservation of a host's time. `start_time`/`end_time` are
/// absolute instants; all overlap math runs on the half-open interval
/// `[start_time, end_time)`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub event_type_id: Uuid,
    pub host_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub additional_info: Option<String>,
    /// Stays NULL until the meeting-provider call succeeds; provider
    /// failure never fails the booking.
    pub meeting_link: Option<String>,
    pub status: BookingStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// What a guest submits to book a slot. The host is derived server-side
/// from the event type, never trusted from the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingRequest {
    pub event_type_id: Uuid,
    #[validate(length(min = 1, message = "Name is required"))]
    pub guest_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub guest_email: String,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub additional_info: Option<String>,
}

/// Fully resolved insert payload handed to the store once the request has
/// passed validation.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_type_id: Uuid,
    pub host_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub additional_info: Option<String>,
}

impl NewBooking {
    pub fn from_request(req: BookingRequest, host_id: Uuid) -> Self {
        Self {
            event_type_id: req.event_type_id,
            host_id,
            guest_name: req.guest_name,
            guest_email: req.guest_email,
            start_time: req.start_time,
            end_time: req.end_time,
            additional_info: req.additional_info,
        }
    }
}
