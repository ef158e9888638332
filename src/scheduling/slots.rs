//! Candidate slot generation from a weekly schedule.
//!
//! Generation is a pure function of the schedule, the event duration, a
//! date range, and an injected `now`; it never reads an ambient clock.

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

use crate::db::{DayRule, WeeklySchedule};

/// A computed, not-yet-committed bookable interval. `start`/`end` are
/// absolute instants in the host's reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    pub date: Date,
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

/// Walk every date in `[range_start, range_end]` and emit consecutive
/// slots of `duration_minutes` within that weekday's window, advancing by
/// duration + gap. Slots starting before `now` are dropped. The sequence
/// is lazy and finite; a range with no available weekdays is simply empty.
pub fn generate(
    schedule: &WeeklySchedule,
    duration_minutes: i32,
    range_start: Date,
    range_end: Date,
    now: OffsetDateTime,
) -> impl Iterator<Item = CandidateSlot> + '_ {
    let offset = schedule.offset();
    let gap = schedule.time_gap_minutes.max(0);
    dates(range_start, range_end)
        .flat_map(move |date| {
            DaySlots::new(schedule.day(date.weekday()), date, duration_minutes, gap, offset)
        })
        .filter(move |slot| slot.start >= now)
}

fn dates(start: Date, end: Date) -> impl Iterator<Item = Date> {
    std::iter::successors((start <= end).then_some(start), move |d| {
        d.next_day().filter(|next| *next <= end)
    })
}

/// Slot cursor for a single date. Unavailable days are constructed with an
/// already-exhausted window.
struct DaySlots {
    date: Date,
    offset: UtcOffset,
    cursor: i32,
    window_end: i32,
    duration: i32,
    gap: i32,
}

impl DaySlots {
    fn new(rule: &DayRule, date: Date, duration: i32, gap: i32, offset: UtcOffset) -> Self {
        let (cursor, window_end) = if rule.is_available && duration > 0 {
            (minute_of_day(rule.start_time), minute_of_day(rule.end_time))
        } else {
            (0, -1)
        };
        Self {
            date,
            offset,
            cursor,
            window_end,
            duration,
            gap,
        }
    }
}

impl Iterator for DaySlots {
    type Item = CandidateSlot;

    fn next(&mut self) -> Option<CandidateSlot> {
        if self.cursor + self.duration > self.window_end {
            return None;
        }
        let start = self.date.midnight().assume_offset(self.offset)
            + Duration::minutes(i64::from(self.cursor));
        let end = start + Duration::minutes(i64::from(self.duration));
        let slot = CandidateSlot {
            date: self.date,
            start,
            end,
        };
        self.cursor += self.duration + self.gap;
        Some(slot)
    }
}

fn minute_of_day(t: Time) -> i32 {
    i32::from(t.hour()) * 60 + i32::from(t.minute())
}
