//! Soft cancellation: a status flip that immediately frees the interval.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::store::BookingStore;
use super::CancellationError;
use crate::db::{BookingStatus, DatabaseError};

pub struct CancellationHandler {
    store: Arc<dyn BookingStore>,
}

impl CancellationHandler {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Cancel a booking on behalf of `requester_id`, which must be the
    /// host who owns the booking. Idempotent: cancelling an already
    /// cancelled booking is `Ok` with no state change, so retries are
    /// always safe. Bookings are never deleted.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), CancellationError> {
        let booking = self.store.get_booking(booking_id).await.map_err(|e| match e {
            DatabaseError::NotFound => CancellationError::NotFound,
            other => CancellationError::Store(other),
        })?;

        if booking.host_id != requester_id {
            return Err(CancellationError::AuthorizationDenied);
        }
        if booking.status == BookingStatus::Cancelled {
            return Ok(());
        }

        self.store
            .update_booking_status(booking_id, BookingStatus::Cancelled)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound => CancellationError::NotFound,
                other => CancellationError::Store(other),
            })?;
        info!(booking_id = %booking_id, "Booking cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BookingRequest, WeeklySchedule};
    use crate::meetings::{MeetingDetails, MeetingError, MeetingProvider};
    use crate::scheduling::store::testing::{event_type, MemoryStore};
    use crate::scheduling::{BookingCoordinator, BookingError};
    use async_trait::async_trait;
    use time::macros::datetime;

    struct NoProvider;

    #[async_trait]
    impl MeetingProvider for NoProvider {
        async fn create_meeting(
            &self,
            _booking: &crate::db::Booking,
        ) -> Result<MeetingDetails, MeetingError> {
            Err(MeetingError::Disabled)
        }
    }

    async fn setup() -> (Arc<MemoryStore>, BookingCoordinator, CancellationHandler, crate::db::EventType) {
        let host_id = Uuid::now_v7();
        let store = Arc::new(MemoryStore::default());
        store
            .add_schedule(WeeklySchedule::with_defaults(host_id))
            .await;
        let et = event_type(host_id, 30);
        store.add_event_type(et.clone()).await;
        let coordinator = BookingCoordinator::new(
            Arc::clone(&store) as Arc<dyn BookingStore>,
            Arc::new(NoProvider),
        );
        let cancellations = CancellationHandler::new(Arc::clone(&store) as Arc<dyn BookingStore>);
        (store, coordinator, cancellations, et)
    }

    fn request(event_type_id: Uuid) -> BookingRequest {
        BookingRequest {
            event_type_id,
            guest_name: "Ada".to_string(),
            guest_email: "ada@example.com".to_string(),
            start_time: datetime!(2026-01-05 10:00 UTC),
            end_time: datetime!(2026-01-05 10:30 UTC),
            additional_info: None,
        }
    }

    #[tokio::test]
    async fn host_can_cancel_and_the_interval_becomes_rebookable() {
        let (_store, coordinator, cancellations, et) = setup().await;
        let booking = coordinator.create_booking(request(et.id)).await.unwrap();

        // Identical interval is taken until the cancellation lands.
        let retry = coordinator.create_booking(request(et.id)).await;
        assert!(matches!(retry, Err(BookingError::Conflict)));

        cancellations
            .cancel_booking(booking.id, et.host_id)
            .await
            .unwrap();
        coordinator.create_booking(request(et.id)).await.unwrap();
    }

    #[tokio::test]
    async fn non_owner_is_denied() {
        let (store, coordinator, cancellations, et) = setup().await;
        let booking = coordinator.create_booking(request(et.id)).await.unwrap();

        let result = cancellations.cancel_booking(booking.id, Uuid::now_v7()).await;
        assert!(matches!(result, Err(CancellationError::AuthorizationDenied)));
        assert_eq!(store.confirmed_count(et.host_id).await, 1);
    }

    #[tokio::test]
    async fn cancelling_twice_is_idempotent() {
        let (store, coordinator, cancellations, et) = setup().await;
        let booking = coordinator.create_booking(request(et.id)).await.unwrap();

        cancellations
            .cancel_booking(booking.id, et.host_id)
            .await
            .unwrap();
        let first_update = store.booking(booking.id).await.unwrap().updated_at;

        cancellations
            .cancel_booking(booking.id, et.host_id)
            .await
            .unwrap();
        let stored = store.booking(booking.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.updated_at, first_update);
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (_store, _coordinator, cancellations, et) = setup().await;
        let result = cancellations.cancel_booking(Uuid::now_v7(), et.host_id).await;
        assert!(matches!(result, Err(CancellationError::NotFound)));
    }
}
