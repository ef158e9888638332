use super::handlers::{cancel_booking, create_booking, get_available_slots};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/events/:event_type_id/slots", get(get_available_slots))
        .route("/bookings", post(create_booking))
        .route("/bookings/:booking_id/cancel", post(cancel_booking))
}
