use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{DatabaseError, UpdateSchedulePayload, WeeklySchedule};
use crate::error::{AppError, AppResult};

/// The host's weekly schedule. A host that has never edited availability
/// gets the default Mon-Fri working-hours schedule.
pub async fn get_availability(
    State(state): State<AppState>,
    Path(host_id): Path<Uuid>,
) -> AppResult<Json<WeeklySchedule>> {
    match state.store.get_availability_rule(host_id).await {
        Ok(schedule) => Ok(Json(schedule)),
        Err(DatabaseError::NotFound) => Ok(Json(WeeklySchedule::with_defaults(host_id))),
        Err(e) => Err(e.into()),
    }
}

/// Replace the host's full seven-day schedule. Existing confirmed
/// bookings are left untouched; a rule edit never revalidates them.
pub async fn update_availability(
    State(state): State<AppState>,
    Path(host_id): Path<Uuid>,
    Json(payload): Json<UpdateSchedulePayload>,
) -> AppResult<Json<WeeklySchedule>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let schedule = payload.into_schedule(host_id);
    if !schedule.is_valid() {
        return Err(AppError::Validation(
            "Each available day needs start_time earlier than end_time".to_string(),
        ));
    }

    state.store.put_availability_rule(&schedule).await?;
    Ok(Json(schedule))
}
