//! Storage port consumed by the engine.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{
    Booking, BookingStatus, DatabaseError, EventType, NewBooking, NewEventType, WeeklySchedule,
};

/// Everything the engine needs from persistent storage. The production
/// implementation is `db::PgBookingStore`; tests use an in-memory double.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// The host's seven-day schedule. `DatabaseError::NotFound` when the
    /// host has never stored one.
    async fn get_availability_rule(&self, host_id: Uuid) -> Result<WeeklySchedule, DatabaseError>;

    /// Replace the host's schedule wholesale.
    async fn put_availability_rule(&self, schedule: &WeeklySchedule) -> Result<(), DatabaseError>;

    async fn get_event_type(&self, event_type_id: Uuid) -> Result<EventType, DatabaseError>;

    async fn insert_event_type(&self, new: &NewEventType) -> Result<EventType, DatabaseError>;

    /// Non-private event types for a host's public page.
    async fn list_public_event_types(&self, host_id: Uuid)
        -> Result<Vec<EventType>, DatabaseError>;

    /// Confirmed bookings intersecting `[range_start, range_end)` for one
    /// host. Read-only; snapshot consistency is fine here.
    async fn list_confirmed_bookings(
        &self,
        host_id: Uuid,
        range_start: OffsetDateTime,
        range_end: OffsetDateTime,
    ) -> Result<Vec<Booking>, DatabaseError>;

    /// The atomic commit primitive: check-then-insert as one unit.
    /// Returns `DatabaseError::Conflict` when the interval is taken.
    async fn insert_booking_if_no_conflict(
        &self,
        new: &NewBooking,
    ) -> Result<Booking, DatabaseError>;

    async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, DatabaseError>;

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<(), DatabaseError>;

    /// Attach the meeting join link after the fact. Best-effort caller.
    async fn set_meeting_link(&self, booking_id: Uuid, link: &str) -> Result<(), DatabaseError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store double and fixtures shared by the engine tests.

    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;
    use crate::scheduling::conflict;
    use crate::scheduling::slots::CandidateSlot;

    #[derive(Default)]
    struct Inner {
        schedules: HashMap<Uuid, WeeklySchedule>,
        event_types: HashMap<Uuid, EventType>,
        bookings: HashMap<Uuid, Booking>,
    }

    /// All state behind a single lock so `insert_booking_if_no_conflict`
    /// is check-then-insert under one critical section, mirroring the
    /// transactional guarantee of the real store.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        inner: Mutex<Inner>,
    }

    impl MemoryStore {
        pub(crate) async fn add_schedule(&self, schedule: WeeklySchedule) {
            self.inner
                .lock()
                .await
                .schedules
                .insert(schedule.host_id, schedule);
        }

        pub(crate) async fn add_event_type(&self, event_type: EventType) {
            self.inner
                .lock()
                .await
                .event_types
                .insert(event_type.id, event_type);
        }

        pub(crate) async fn booking(&self, id: Uuid) -> Option<Booking> {
            self.inner.lock().await.bookings.get(&id).cloned()
        }

        pub(crate) async fn confirmed_count(&self, host_id: Uuid) -> usize {
            self.inner
                .lock()
                .await
                .bookings
                .values()
                .filter(|b| b.host_id == host_id && b.status == BookingStatus::Confirmed)
                .count()
        }
    }

    #[async_trait]
    impl BookingStore for MemoryStore {
        async fn get_availability_rule(
            &self,
            host_id: Uuid,
        ) -> Result<WeeklySchedule, DatabaseError> {
            self.inner
                .lock()
                .await
                .schedules
                .get(&host_id)
                .cloned()
                .ok_or(DatabaseError::NotFound)
        }

        async fn put_availability_rule(
            &self,
            schedule: &WeeklySchedule,
        ) -> Result<(), DatabaseError> {
            self.inner
                .lock()
                .await
                .schedules
                .insert(schedule.host_id, schedule.clone());
            Ok(())
        }

        async fn get_event_type(&self, event_type_id: Uuid) -> Result<EventType, DatabaseError> {
            self.inner
                .lock()
                .await
                .event_types
                .get(&event_type_id)
                .cloned()
                .ok_or(DatabaseError::NotFound)
        }

        async fn insert_event_type(
            &self,
            new: &NewEventType,
        ) -> Result<EventType, DatabaseError> {
            let event_type = EventType {
                id: Uuid::now_v7(),
                host_id: new.host_id,
                title: new.title.clone(),
                description: new.description.clone(),
                duration_minutes: new.duration_minutes,
                is_private: new.is_private,
                created_at: OffsetDateTime::now_utc(),
            };
            self.inner
                .lock()
                .await
                .event_types
                .insert(event_type.id, event_type.clone());
            Ok(event_type)
        }

        async fn list_public_event_types(
            &self,
            host_id: Uuid,
        ) -> Result<Vec<EventType>, DatabaseError> {
            Ok(self
                .inner
                .lock()
                .await
                .event_types
                .values()
                .filter(|e| e.host_id == host_id && !e.is_private)
                .cloned()
                .collect())
        }

        async fn list_confirmed_bookings(
            &self,
            host_id: Uuid,
            range_start: OffsetDateTime,
            range_end: OffsetDateTime,
        ) -> Result<Vec<Booking>, DatabaseError> {
            Ok(self
                .inner
                .lock()
                .await
                .bookings
                .values()
                .filter(|b| {
                    b.host_id == host_id
                        && b.status == BookingStatus::Confirmed
                        && conflict::overlaps(b.start_time, b.end_time, range_start, range_end)
                })
                .cloned()
                .collect())
        }

        async fn insert_booking_if_no_conflict(
            &self,
            new: &NewBooking,
        ) -> Result<Booking, DatabaseError> {
            let mut inner = self.inner.lock().await;
            let taken = inner.bookings.values().any(|b| {
                b.host_id == new.host_id
                    && b.status == BookingStatus::Confirmed
                    && conflict::overlaps(b.start_time, b.end_time, new.start_time, new.end_time)
            });
            if taken {
                return Err(DatabaseError::Conflict);
            }
            let now = OffsetDateTime::now_utc();
            let booking = Booking {
                id: Uuid::now_v7(),
                event_type_id: new.event_type_id,
                host_id: new.host_id,
                guest_name: new.guest_name.clone(),
                guest_email: new.guest_email.clone(),
                start_time: new.start_time,
                end_time: new.end_time,
                additional_info: new.additional_info.clone(),
                meeting_link: None,
                status: BookingStatus::Confirmed,
                created_at: now,
                updated_at: now,
            };
            inner.bookings.insert(booking.id, booking.clone());
            Ok(booking)
        }

        async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, DatabaseError> {
            self.inner
                .lock()
                .await
                .bookings
                .get(&booking_id)
                .cloned()
                .ok_or(DatabaseError::NotFound)
        }

        async fn update_booking_status(
            &self,
            booking_id: Uuid,
            status: BookingStatus,
        ) -> Result<(), DatabaseError> {
            let mut inner = self.inner.lock().await;
            let booking = inner
                .bookings
                .get_mut(&booking_id)
                .ok_or(DatabaseError::NotFound)?;
            booking.status = status;
            booking.updated_at = OffsetDateTime::now_utc();
            Ok(())
        }

        async fn set_meeting_link(
            &self,
            booking_id: Uuid,
            link: &str,
        ) -> Result<(), DatabaseError> {
            let mut inner = self.inner.lock().await;
            let booking = inner
                .bookings
                .get_mut(&booking_id)
                .ok_or(DatabaseError::NotFound)?;
            booking.meeting_link = Some(link.to_string());
            booking.updated_at = OffsetDateTime::now_utc();
            Ok(())
        }
    }

    pub(crate) fn confirmed_booking(start: OffsetDateTime, end: OffsetDateTime) -> Booking {
        let now = OffsetDateTime::now_utc();
        Booking {
            id: Uuid::now_v7(),
            event_type_id: Uuid::now_v7(),
            host_id: Uuid::now_v7(),
            guest_name: "Ada".to_string(),
            guest_email: "ada@example.com".to_string(),
            start_time: start,
            end_time: end,
            additional_info: None,
            meeting_link: None,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn slot(start: OffsetDateTime, minutes: i64) -> CandidateSlot {
        CandidateSlot {
            date: start.date(),
            start,
            end: start + time::Duration::minutes(minutes),
        }
    }

    pub(crate) fn event_type(host_id: Uuid, duration_minutes: i32) -> EventType {
        EventType {
            id: Uuid::now_v7(),
            host_id,
            title: "Intro call".to_string(),
            description: None,
            duration_minutes,
            is_private: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
