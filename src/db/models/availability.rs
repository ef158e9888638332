use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Time, UtcOffset, Weekday};
use validator::Validate;

pub const DAYS_PER_WEEK: usize = 7;

/// Per-weekday availability window. Times are wall-clock in the host's
/// reference timezone, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRule {
    pub is_available: bool,
    pub start_time: Time,
    pub end_time: Time,
}

impl DayRule {
    pub fn unavailable() -> Self {
        Self {
            is_available: false,
            start_time: Time::MIDNIGHT,
            end_time: Time::MIDNIGHT,
        }
    }

    /// Default working-hours window, matching what a fresh host gets
    /// before they have edited anything.
    pub fn default_working_hours() -> Self {
        Self {
            is_available: true,
            // 09:00 - 17:00
            start_time: time::macros::time!(09:00),
            end_time: time::macros::time!(17:00),
        }
    }

    pub fn window_is_valid(&self) -> bool {
        !self.is_available || self.start_time < self.end_time
    }
}

/// A host's full weekly schedule: exactly seven day rules (Monday first)
/// plus the host-global minimum gap between bookings and the host's
/// reference UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub host_id: Uuid,
    pub days: [DayRule; DAYS_PER_WEEK],
    pub time_gap_minutes: i32,
    pub utc_offset_minutes: i16,
}

impl WeeklySchedule {
    /// Sane defaults for a host that has never edited availability:
    /// Monday-Friday 09:00-17:00, weekend off, no gap, UTC.
    pub fn with_defaults(host_id: Uuid) -> Self {
        let mut days = [DayRule::default_working_hours(); DAYS_PER_WEEK];
        days[Weekday::Saturday.number_days_from_monday() as usize] = DayRule::unavailable();
        days[Weekday::Sunday.number_days_from_monday() as usize] = DayRule::unavailable();
        Self {
            host_id,
            days,
            time_gap_minutes: 0,
            utc_offset_minutes: 0,
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DayRule {
        &self.days[weekday.number_days_from_monday() as usize]
    }

    /// The host's reference timezone as a fixed offset. All slot instants
    /// are materialized in this offset.
    pub fn offset(&self) -> UtcOffset {
        UtcOffset::from_whole_seconds(i32::from(self.utc_offset_minutes) * 60)
            .unwrap_or(UtcOffset::UTC)
    }

    pub fn is_valid(&self) -> bool {
        self.time_gap_minutes >= 0
            && self.utc_offset_minutes.abs() <= 14 * 60
            && self.days.iter().all(DayRule::window_is_valid)
    }
}

/// Inbound payload for replacing a host's weekly schedule.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSchedulePayload {
    pub days: [DayRule; DAYS_PER_WEEK],
    #[validate(range(min = 0, message = "Gap must not be negative"))]
    pub time_gap_minutes: i32,
    #[validate(range(min = -840, max = 840, message = "Offset must be within +/-14 hours"))]
    pub utc_offset_minutes: i16,
}

impl UpdateSchedulePayload {
    pub fn into_schedule(self, host_id: Uuid) -> WeeklySchedule {
        WeeklySchedule {
            host_id,
            days: self.days,
            time_gap_minutes: self.time_gap_minutes,
            utc_offset_minutes: self.utc_offset_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn defaults_cover_weekdays_only() {
        let schedule = WeeklySchedule::with_defaults(Uuid::now_v7());
        assert!(schedule.day(Weekday::Monday).is_available);
        assert!(schedule.day(Weekday::Friday).is_available);
        assert!(!schedule.day(Weekday::Saturday).is_available);
        assert!(!schedule.day(Weekday::Sunday).is_available);
        assert!(schedule.is_valid());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut schedule = WeeklySchedule::with_defaults(Uuid::now_v7());
        schedule.days[0] = DayRule {
            is_available: true,
            start_time: time!(17:00),
            end_time: time!(09:00),
        };
        assert!(!schedule.is_valid());
    }

    #[test]
    fn unavailable_day_skips_window_check() {
        let mut schedule = WeeklySchedule::with_defaults(Uuid::now_v7());
        schedule.days[6] = DayRule::unavailable();
        assert!(schedule.is_valid());
    }
}
