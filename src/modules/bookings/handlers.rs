use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{Booking, BookingRequest};
use crate::error::AppResult;
use crate::scheduling::CandidateSlot;

#[derive(Debug, Deserialize)]
pub struct SlotRangeQuery {
    pub from: Date,
    pub to: Date,
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct DaySlots {
    pub date: Date,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Serialize)]
pub struct AvailableSlotsResponse {
    pub event_type_id: Uuid,
    pub days: Vec<DaySlots>,
}

/// Bookable slots for an event type, grouped by date. The list is a
/// snapshot; the commit re-checks, so a stale pick answers `409`.
pub async fn get_available_slots(
    State(state): State<AppState>,
    Path(event_type_id): Path<Uuid>,
    Query(range): Query<SlotRangeQuery>,
) -> AppResult<Json<AvailableSlotsResponse>> {
    let slots = state
        .scheduler
        .available_slots(event_type_id, range.from, range.to, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(AvailableSlotsResponse {
        event_type_id,
        days: group_by_date(slots),
    }))
}

fn group_by_date(slots: Vec<CandidateSlot>) -> Vec<DaySlots> {
    let mut days: Vec<DaySlots> = Vec::new();
    for slot in slots {
        let view = SlotView {
            start: slot.start,
            end: slot.end,
        };
        match days.last_mut() {
            Some(day) if day.date == slot.date => day.slots.push(view),
            _ => days.push(DaySlots {
                date: slot.date,
                slots: vec![view],
            }),
        }
    }
    days
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state.scheduler.create_booking(payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Deserialize)]
pub struct CancelBookingPayload {
    pub requester_id: Uuid,
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CancelBookingPayload>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .cancellations
        .cancel_booking(booking_id, payload.requester_id)
        .await?;
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}
