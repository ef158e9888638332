use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{DatabaseError, EventType, NewEventType};
use crate::error::{AppError, AppResult};

pub async fn create_event_type(
    State(state): State<AppState>,
    Json(payload): Json<NewEventType>,
) -> AppResult<(StatusCode, Json<EventType>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let event_type = state.store.insert_event_type(&payload).await?;
    Ok((StatusCode::CREATED, Json(event_type)))
}

/// Direct-link fetch; works for private event types too.
pub async fn get_event_type(
    State(state): State<AppState>,
    Path(event_type_id): Path<Uuid>,
) -> AppResult<Json<EventType>> {
    match state.store.get_event_type(event_type_id).await {
        Ok(event_type) => Ok(Json(event_type)),
        Err(DatabaseError::NotFound) => {
            Err(AppError::NotFound(format!("Event type {}", event_type_id)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Public listing for a host's page; private event types are excluded
/// here but remain bookable through their direct link.
pub async fn list_host_event_types(
    State(state): State<AppState>,
    Path(host_id): Path<Uuid>,
) -> AppResult<Json<Vec<EventType>>> {
    let event_types = state.store.list_public_event_types(host_id).await?;
    Ok(Json(event_types))
}
