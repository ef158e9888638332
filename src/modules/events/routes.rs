use super::handlers::{create_event_type, get_event_type, list_host_event_types};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event_type))
        .route("/events/:event_type_id", get(get_event_type))
        .route("/hosts/:host_id/events", get(list_host_event_types))
}
