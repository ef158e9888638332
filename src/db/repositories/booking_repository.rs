use async_trait::async_trait;
use sqlx::PgPool;
use time::{OffsetDateTime, Time};
use uuid::Uuid;

use crate::db::{
    Booking, BookingStatus, DatabaseError, DayRule, EventType, NewBooking, NewEventType,
    WeeklySchedule, DAYS_PER_WEEK,
};
use crate::scheduling::BookingStore;

/// Postgres-backed store. `insert_booking_if_no_conflict` serializes the
/// check-then-insert per host with an advisory transaction lock; the
/// `bookings_no_overlap` exclusion constraint backstops the same invariant
/// at the storage level.
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_err(e: sqlx::Error) -> DatabaseError {
    match &e {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(db) if db.constraint() == Some("bookings_no_overlap") => {
            DatabaseError::Conflict
        }
        _ => DatabaseError::Sqlx(e),
    }
}

#[derive(sqlx::FromRow)]
struct AvailabilityRow {
    time_gap_minutes: i32,
    utc_offset_minutes: i16,
}

#[derive(sqlx::FromRow)]
struct DayRow {
    weekday: i16,
    is_available: bool,
    start_time: Time,
    end_time: Time,
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn get_availability_rule(&self, host_id: Uuid) -> Result<WeeklySchedule, DatabaseError> {
        let settings = sqlx::query_as::<_, AvailabilityRow>(
            "SELECT time_gap_minutes, utc_offset_minutes FROM availabilities WHERE host_id = $1",
        )
        .bind(host_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?
        .ok_or(DatabaseError::NotFound)?;

        let day_rows = sqlx::query_as::<_, DayRow>(
            "SELECT weekday, is_available, start_time, end_time
             FROM availability_days WHERE host_id = $1 ORDER BY weekday",
        )
        .bind(host_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;

        let mut days = [DayRule::unavailable(); DAYS_PER_WEEK];
        for row in day_rows {
            if let Ok(index) = usize::try_from(row.weekday) {
                if index < DAYS_PER_WEEK {
                    days[index] = DayRule {
                        is_available: row.is_available,
                        start_time: row.start_time,
                        end_time: row.end_time,
                    };
                }
            }
        }

        Ok(WeeklySchedule {
            host_id,
            days,
            time_gap_minutes: settings.time_gap_minutes,
            utc_offset_minutes: settings.utc_offset_minutes,
        })
    }

    async fn put_availability_rule(&self, schedule: &WeeklySchedule) -> Result<(), DatabaseError> {
        if !schedule.is_valid() {
            return Err(DatabaseError::InvalidInput(
                "Schedule windows must have start < end and a non-negative gap".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(map_err)?;
        sqlx::query(
            "INSERT INTO availabilities (host_id, time_gap_minutes, utc_offset_minutes)
             VALUES ($1, $2, $3)
             ON CONFLICT (host_id) DO UPDATE
             SET time_gap_minutes = EXCLUDED.time_gap_minutes,
                 utc_offset_minutes = EXCLUDED.utc_offset_minutes,
                 updated_at = NOW()",
        )
        .bind(schedule.host_id)
        .bind(schedule.time_gap_minutes)
        .bind(schedule.utc_offset_minutes)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        for (weekday, day) in schedule.days.iter().enumerate() {
            sqlx::query(
                "INSERT INTO availability_days (host_id, weekday, is_available, start_time, end_time)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (host_id, weekday) DO UPDATE
                 SET is_available = EXCLUDED.is_available,
                     start_time = EXCLUDED.start_time,
                     end_time = EXCLUDED.end_time",
            )
            .bind(schedule.host_id)
            .bind(weekday as i16)
            .bind(day.is_available)
            .bind(day.start_time)
            .bind(day.end_time)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        }

        tx.commit().await.map_err(map_err)?;
        Ok(())
    }

    async fn get_event_type(&self, event_type_id: Uuid) -> Result<EventType, DatabaseError> {
        sqlx::query_as::<_, EventType>("SELECT * FROM event_types WHERE id = $1")
            .bind(event_type_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?
            .ok_or(DatabaseError::NotFound)
    }

    async fn insert_event_type(&self, new: &NewEventType) -> Result<EventType, DatabaseError> {
        sqlx::query_as::<_, EventType>(
            "INSERT INTO event_types (id, host_id, title, description, duration_minutes, is_private)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(new.host_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.duration_minutes)
        .bind(new.is_private)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_public_event_types(
        &self,
        host_id: Uuid,
    ) -> Result<Vec<EventType>, DatabaseError> {
        sqlx::query_as::<_, EventType>(
            "SELECT * FROM event_types
             WHERE host_id = $1 AND NOT is_private
             ORDER BY created_at",
        )
        .bind(host_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn list_confirmed_bookings(
        &self,
        host_id: Uuid,
        range_start: OffsetDateTime,
        range_end: OffsetDateTime,
    ) -> Result<Vec<Booking>, DatabaseError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE host_id = $1
               AND status = 'confirmed'
               AND start_time < $3
               AND end_time > $2
             ORDER BY start_time",
        )
        .bind(host_id)
        .bind(range_start)
        .bind(range_end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn insert_booking_if_no_conflict(
        &self,
        new: &NewBooking,
    ) -> Result<Booking, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        // Linearize all commits for this host; other hosts are unaffected.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(new.host_id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM bookings
                 WHERE host_id = $1
                   AND status = 'confirmed'
                   AND start_time < $3
                   AND end_time > $2
             )",
        )
        .bind(new.host_id)
        .bind(new.start_time)
        .bind(new.end_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_err)?;
        if taken {
            return Err(DatabaseError::Conflict);
        }

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings
                 (id, event_type_id, host_id, guest_name, guest_email,
                  start_time, end_time, additional_info, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'confirmed')
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(new.event_type_id)
        .bind(new.host_id)
        .bind(&new.guest_name)
        .bind(&new.guest_email)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.additional_info)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;
        Ok(booking)
    }

    async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, DatabaseError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?
            .ok_or(DatabaseError::NotFound)
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(booking_id)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn set_meeting_link(&self, booking_id: Uuid, link: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE bookings SET meeting_link = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(booking_id)
        .bind(link)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
