//! Pure interval-overlap checks against existing bookings.
//!
//! `validate` must be re-run against the latest bookings immediately
//! before commit; the candidate list shown to a guest may already be stale
//! by the time they submit.

use thiserror::Error;
use time::OffsetDateTime;

use super::slots::CandidateSlot;
use crate::db::{Booking, BookingStatus};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Requested interval overlaps an existing confirmed booking")]
pub struct SlotConflict;

/// Half-open interval overlap: `[a_start, a_end)` intersects
/// `[b_start, b_end)`. Back-to-back intervals do not overlap.
pub fn overlaps(
    a_start: OffsetDateTime,
    a_end: OffsetDateTime,
    b_start: OffsetDateTime,
    b_end: OffsetDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Drop every candidate that intersects a confirmed booking.
pub fn filter_available<'a, I>(
    candidates: I,
    existing: &'a [Booking],
) -> impl Iterator<Item = CandidateSlot> + 'a
where
    I: Iterator<Item = CandidateSlot> + 'a,
{
    candidates.filter(move |slot| !conflicts_with_any(slot.start, slot.end, existing))
}

/// Commit-time check for one requested interval.
pub fn validate(
    start: OffsetDateTime,
    end: OffsetDateTime,
    existing: &[Booking],
) -> Result<(), SlotConflict> {
    if conflicts_with_any(start, end, existing) {
        Err(SlotConflict)
    } else {
        Ok(())
    }
}

fn conflicts_with_any(start: OffsetDateTime, end: OffsetDateTime, existing: &[Booking]) -> bool {
    existing.iter().any(|b| {
        b.status == BookingStatus::Confirmed && overlaps(start, end, b.start_time, b.end_time)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::store::testing::{confirmed_booking, slot};
    use time::macros::datetime;

    #[test]
    fn half_open_overlap_rules() {
        let a = datetime!(2026-02-02 10:00 UTC);
        let b = datetime!(2026-02-02 10:30 UTC);
        let c = datetime!(2026-02-02 11:00 UTC);
        let d = datetime!(2026-02-02 11:30 UTC);

        assert!(overlaps(a, c, b, d)); // partial
        assert!(overlaps(a, d, b, c)); // containment
        assert!(overlaps(a, c, a, c)); // identical
        assert!(!overlaps(a, b, b, c)); // back-to-back
        assert!(!overlaps(a, b, c, d)); // disjoint
    }

    #[test]
    fn filter_removes_intersecting_candidates() {
        let taken = confirmed_booking(
            datetime!(2026-02-02 10:00 UTC),
            datetime!(2026-02-02 10:30 UTC),
        );
        let candidates = vec![
            slot(datetime!(2026-02-02 09:30 UTC), 30),
            slot(datetime!(2026-02-02 10:00 UTC), 30),
            slot(datetime!(2026-02-02 10:30 UTC), 30),
        ];

        let free: Vec<_> =
            filter_available(candidates.into_iter(), std::slice::from_ref(&taken)).collect();
        assert_eq!(free.len(), 2);
        assert!(free.iter().all(|s| s.start != taken.start_time));
    }

    #[test]
    fn cancelled_bookings_do_not_block() {
        let mut cancelled = confirmed_booking(
            datetime!(2026-02-02 10:00 UTC),
            datetime!(2026-02-02 10:30 UTC),
        );
        cancelled.status = BookingStatus::Cancelled;

        assert_eq!(
            validate(
                datetime!(2026-02-02 10:00 UTC),
                datetime!(2026-02-02 10:30 UTC),
                std::slice::from_ref(&cancelled),
            ),
            Ok(())
        );
    }

    #[test]
    fn validate_rejects_taken_interval() {
        let taken = confirmed_booking(
            datetime!(2026-02-02 10:00 UTC),
            datetime!(2026-02-02 10:30 UTC),
        );
        assert_eq!(
            validate(
                datetime!(2026-02-02 10:15 UTC),
                datetime!(2026-02-02 10:45 UTC),
                std::slice::from_ref(&taken),
            ),
            Err(SlotConflict)
        );
    }
}
