use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::limits::{MAX_DURATION_MINUTES, MAX_QUERY_DAYS, MIN_DURATION_MINUTES};
use crate::model::{Booking, BookingStatus, Span};

use super::SchedulerError;

/// Half-open overlap test against one booking. Cancelled bookings never
/// conflict, nor does the booking named by `exclude` (a booking being
/// re-validated against its own new time).
pub fn conflicts(booking: &Booking, room_id: Ulid, span: &Span, exclude: Option<Ulid>) -> bool {
    if exclude == Some(booking.id) {
        return false;
    }
    if booking.room_id != room_id || booking.status == BookingStatus::Cancelled {
        return false;
    }
    booking.span().overlaps(span)
}

pub(crate) fn validate_times(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), SchedulerError> {
    if start >= end {
        return Err(SchedulerError::Validation("end must be after start"));
    }
    Ok(())
}

pub(crate) fn validate_duration(minutes: i64) -> Result<(), SchedulerError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(SchedulerError::Validation(
            "duration must be between 15 and 480 minutes",
        ));
    }
    Ok(())
}

/// Boundary check for availability queries: ordered endpoints, at most 30
/// calendar days (partial days count as whole days).
pub(crate) fn validate_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), SchedulerError> {
    validate_times(start, end)?;
    let days = ((end - start).num_seconds() + 86_399) / 86_400;
    if days > MAX_QUERY_DAYS {
        return Err(SchedulerError::Validation(
            "search period cannot exceed 30 days",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn booking(room_id: Ulid, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: Ulid::new(),
            event_id: "evt".into(),
            calendar_id: "cal".into(),
            room_id,
            title: "standup".into(),
            description: None,
            start_time: start,
            end_time: end,
            organizer: "alice@example.com".into(),
            attendees: Vec::new(),
            status: BookingStatus::Confirmed,
            recurring_event_id: None,
            is_recurring: false,
            created_at: at(0, 0),
            updated_at: at(0, 0),
        }
    }

    #[test]
    fn partial_overlap_conflicts() {
        let room = Ulid::new();
        let b = booking(room, at(10, 0), at(11, 0));
        let candidate = Span::new(at(10, 30), at(11, 30));
        assert!(conflicts(&b, room, &candidate, None));
    }

    #[test]
    fn candidate_inside_existing_conflicts() {
        let room = Ulid::new();
        let b = booking(room, at(10, 0), at(12, 0));
        assert!(conflicts(&b, room, &Span::new(at(10, 30), at(11, 0)), None));
    }

    #[test]
    fn candidate_surrounding_existing_conflicts() {
        let room = Ulid::new();
        let b = booking(room, at(10, 0), at(11, 0));
        assert!(conflicts(&b, room, &Span::new(at(9, 0), at(12, 0)), None));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let room = Ulid::new();
        let b = booking(room, at(10, 0), at(11, 0));
        assert!(!conflicts(&b, room, &Span::new(at(11, 0), at(12, 0)), None));
        assert!(!conflicts(&b, room, &Span::new(at(9, 0), at(10, 0)), None));
    }

    #[test]
    fn other_room_does_not_conflict() {
        let b = booking(Ulid::new(), at(10, 0), at(11, 0));
        assert!(!conflicts(
            &b,
            Ulid::new(),
            &Span::new(at(10, 0), at(11, 0)),
            None
        ));
    }

    #[test]
    fn cancelled_booking_never_conflicts() {
        let room = Ulid::new();
        let mut b = booking(room, at(10, 0), at(11, 0));
        b.status = BookingStatus::Cancelled;
        assert!(!conflicts(&b, room, &Span::new(at(10, 0), at(11, 0)), None));
    }

    #[test]
    fn excluded_booking_never_conflicts() {
        let room = Ulid::new();
        let b = booking(room, at(10, 0), at(11, 0));
        assert!(!conflicts(
            &b,
            room,
            &Span::new(at(10, 30), at(11, 30)),
            Some(b.id)
        ));
    }

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(15).is_ok());
        assert!(validate_duration(480).is_ok());
        assert!(validate_duration(14).is_err());
        assert!(validate_duration(481).is_err());
        assert!(validate_duration(0).is_err());
    }

    #[test]
    fn range_bounds() {
        let start = at(9, 0);
        assert!(validate_range(start, start + Duration::days(30)).is_ok());
        assert!(validate_range(start, start + Duration::days(30) + Duration::minutes(1)).is_err());
        assert!(validate_range(start, start).is_err());
        assert!(validate_range(start, start - Duration::minutes(1)).is_err());
    }
}
