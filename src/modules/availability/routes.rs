use super::handlers::{get_availability, update_availability};
use crate::app_state::AppState;
use axum::{routing::get, Router};

pub fn availability_routes() -> Router<AppState> {
    Router::new().route(
        "/hosts/:host_id/availability",
        get(get_availability).put(update_availability),
    )
}
