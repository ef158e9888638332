//! Orchestrates slot listing and the booking commit protocol.
//!
//! The single load-bearing invariant lives here: for one host, the
//! conflict re-check and the insert happen under a per-host serialization
//! boundary, so two near-simultaneous requests for the same interval can
//! never both commit. Listing stays lock-free; a slightly stale candidate
//! list is fine because correctness is enforced at commit time.

use std::collections::HashMap;
use std::sync::Arc;

use time::{Date, Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::conflict;
use super::slots::{self, CandidateSlot};
use super::store::BookingStore;
use super::BookingError;
use crate::db::{Booking, BookingRequest, DatabaseError, EventType, NewBooking, WeeklySchedule};
use crate::meetings::MeetingProvider;

/// One async mutex per host, created lazily. Bookings for different hosts
/// never contend with each other.
#[derive(Default)]
struct HostLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl HostLocks {
    async fn for_host(&self, host_id: Uuid) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        Arc::clone(map.entry(host_id).or_default())
    }
}

pub struct BookingCoordinator {
    store: Arc<dyn BookingStore>,
    meetings: Arc<dyn MeetingProvider>,
    locks: HostLocks,
}

impl BookingCoordinator {
    pub fn new(store: Arc<dyn BookingStore>, meetings: Arc<dyn MeetingProvider>) -> Self {
        Self {
            store,
            meetings,
            locks: HostLocks::default(),
        }
    }

    /// Bookable slots for an event type over `[range_start, range_end]`,
    /// already filtered against confirmed bookings. `now` is injected so
    /// the result is deterministic under test.
    pub async fn available_slots(
        &self,
        event_type_id: Uuid,
        range_start: Date,
        range_end: Date,
        now: OffsetDateTime,
    ) -> Result<Vec<CandidateSlot>, BookingError> {
        let event_type = self.event_type(event_type_id).await?;
        let schedule = self.schedule(event_type.host_id).await?;

        let offset = schedule.offset();
        let window_start = range_start.midnight().assume_offset(offset);
        let window_end = range_end.midnight().assume_offset(offset) + Duration::days(1);
        let existing = self
            .store
            .list_confirmed_bookings(event_type.host_id, window_start, window_end)
            .await
            .map_err(BookingError::Store)?;

        let candidates = slots::generate(
            &schedule,
            event_type.duration_minutes,
            range_start,
            range_end,
            now,
        );
        Ok(conflict::filter_available(candidates, &existing).collect())
    }

    /// Validate and commit one requested slot. On success the meeting-link
    /// task is spawned outside the critical section; its outcome never
    /// changes the commit result.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        request
            .validate()
            .map_err(|e| BookingError::InvalidRequest(e.to_string()))?;

        let event_type = self.event_type(request.event_type_id).await?;
        let schedule = self.schedule(event_type.host_id).await?;
        check_against_rule(&request, &event_type, &schedule)?;

        let host_id = event_type.host_id;
        let lock = self.locks.for_host(host_id).await;
        let booking = {
            let _serialized = lock.lock().await;

            // Re-check against the latest bookings; the candidate list the
            // guest saw may be stale.
            let existing = self
                .store
                .list_confirmed_bookings(host_id, request.start_time, request.end_time)
                .await
                .map_err(BookingError::Store)?;
            conflict::validate(request.start_time, request.end_time, &existing)
                .map_err(|_| BookingError::Conflict)?;

            let new = NewBooking::from_request(request, host_id);
            match self.store.insert_booking_if_no_conflict(&new).await {
                Ok(booking) => booking,
                Err(DatabaseError::Conflict) => return Err(BookingError::Conflict),
                Err(e) => return Err(BookingError::Store(e)),
            }
        };

        info!(
            booking_id = %booking.id,
            host_id = %host_id,
            start = %booking.start_time,
            "Booking confirmed"
        );
        self.spawn_meeting_link(booking.clone());
        Ok(booking)
    }

    fn spawn_meeting_link(&self, booking: Booking) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let meetings = Arc::clone(&self.meetings);
        tokio::spawn(async move {
            attach_meeting_link(store, meetings, booking).await;
        })
    }

    async fn event_type(&self, event_type_id: Uuid) -> Result<EventType, BookingError> {
        self.store
            .get_event_type(event_type_id)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound => BookingError::EventTypeNotFound,
                other => BookingError::Store(other),
            })
    }

    async fn schedule(&self, host_id: Uuid) -> Result<WeeklySchedule, BookingError> {
        self.store
            .get_availability_rule(host_id)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound => BookingError::HostNotFound,
                other => BookingError::Store(other),
            })
    }
}

/// Defense against stale or tampered client payloads: the interval must
/// match the server-known duration and fall inside the weekday window of
/// the host's rule.
fn check_against_rule(
    request: &BookingRequest,
    event_type: &EventType,
    schedule: &WeeklySchedule,
) -> Result<(), BookingError> {
    let duration = request.end_time - request.start_time;
    if duration != Duration::minutes(i64::from(event_type.duration_minutes)) {
        return Err(BookingError::InvalidRequest(
            "Requested interval does not match the event duration".to_string(),
        ));
    }

    let local_start = request.start_time.to_offset(schedule.offset());
    let local_end = request.end_time.to_offset(schedule.offset());
    let rule = schedule.day(local_start.weekday());
    if !rule.is_available {
        return Err(BookingError::InvalidRequest(
            "Host is not available on the requested weekday".to_string(),
        ));
    }
    if local_end.date() != local_start.date()
        || local_start.time() < rule.start_time
        || local_end.time() > rule.end_time
    {
        return Err(BookingError::InvalidRequest(
            "Requested interval falls outside the host's availability window".to_string(),
        ));
    }
    Ok(())
}

/// Best-effort post-commit side effect. Failure is logged and leaves
/// `meeting_link` NULL; the booking stays confirmed either way.
pub(crate) async fn attach_meeting_link(
    store: Arc<dyn BookingStore>,
    meetings: Arc<dyn MeetingProvider>,
    booking: Booking,
) {
    match meetings.create_meeting(&booking).await {
        Ok(details) => match store.set_meeting_link(booking.id, &details.join_link).await {
            Ok(()) => info!(booking_id = %booking.id, "Meeting link attached"),
            Err(e) => {
                warn!(booking_id = %booking.id, error = %e, "Failed to persist meeting link")
            }
        },
        Err(e) => {
            let degraded = BookingError::UpstreamUnavailable(e.to_string());
            warn!(
                booking_id = %booking.id,
                error = %degraded,
                "Meeting link creation failed; booking remains confirmed without a link"
            );
        }
    }
}
