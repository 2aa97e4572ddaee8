use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::limits::{DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR};

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Span {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Daily open-for-booking hours, anchored onto calendar dates to produce
/// working windows. The same hours apply to every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_DAY_START_HOUR,
            end_hour: DEFAULT_DAY_END_HOUR,
        }
    }
}

impl WorkingHours {
    /// The working window for one calendar day. Hours are validated at
    /// construction time, so anchoring cannot fail.
    pub fn window_for(&self, date: NaiveDate) -> Span {
        let start = date.and_hms_opt(self.start_hour, 0, 0).unwrap().and_utc();
        let end = date.and_hms_opt(self.end_hour, 0, 0).unwrap().and_utc();
        Span::new(start, end)
    }
}

/// A candidate bookable interval of exactly the requested duration.
/// Only free slots are emitted, so `is_available` is always true; the flag
/// is kept for wire-format compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub room_id: Ulid,
    pub is_available: bool,
}

/// One calendar day's worth of slots across all requested rooms,
/// sorted by slot start ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// A room reservation backed by an event on the room's external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Ulid,
    pub event_id: String,
    pub calendar_id: String,
    pub room_id: Ulid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub organizer: String,
    pub attendees: Vec<String>,
    pub status: BookingStatus,
    pub recurring_event_id: Option<String>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn span(&self) -> Span {
        Span::new(self.start_time, self.end_time)
    }
}

/// A bookable room. `calendar_id` names the external calendar backing it;
/// at most one active room may exist per calendar id and per
/// case-insensitive name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRoom {
    pub id: Ulid,
    pub name: String,
    pub calendar_id: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: u32,
    pub equipment: Vec<String>,
    pub time_zone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing filters for bookings. `start`/`end` select bookings whose
/// interval touches the range, inclusive on both edges.
#[derive(Debug, Clone, Default)]
pub struct BookingFilters {
    pub room_id: Option<Ulid>,
    pub status: Option<BookingStatus>,
    pub organizer: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Listing filters for rooms. `equipment` requires every named item.
#[derive(Debug, Clone, Default)]
pub struct RoomFilters {
    pub is_active: Option<bool>,
    pub min_capacity: Option<u32>,
    pub equipment: Vec<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    #[test]
    fn span_basics() {
        let s = Span::new(at(9, 0), at(10, 0));
        assert_eq!(s.duration(), Duration::minutes(60));
        assert!(s.contains_instant(at(9, 0)));
        assert!(s.contains_instant(at(9, 59)));
        assert!(!s.contains_instant(at(10, 0))); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(at(9, 0), at(10, 0));
        let b = Span::new(at(9, 30), at(10, 30));
        let c = Span::new(at(10, 0), at(11, 0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn span_contains_span() {
        let outer = Span::new(at(9, 0), at(13, 0));
        let inner = Span::new(at(10, 0), at(12, 0));
        let partial = Span::new(at(8, 0), at(10, 0));
        assert!(outer.contains_span(&inner));
        assert!(outer.contains_span(&outer));
        assert!(!outer.contains_span(&partial));
    }

    #[test]
    fn working_hours_anchor_onto_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let window = WorkingHours::default().window_for(date);
        assert_eq!(window.start, at(9, 0));
        assert_eq!(window.end, at(18, 0));
        assert_eq!(window.duration(), Duration::hours(9));
    }

    #[test]
    fn time_slot_serializes_camel_case() {
        let slot = TimeSlot {
            start: at(9, 0),
            end: at(10, 0),
            room_id: Ulid::new(),
            is_available: true,
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert!(json.get("roomId").is_some());
        assert_eq!(json["isAvailable"], serde_json::Value::Bool(true));
    }

    #[test]
    fn booking_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        let parsed: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, BookingStatus::Cancelled);
    }
}
