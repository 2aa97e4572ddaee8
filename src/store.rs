use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::limits::DEFAULT_PAGE_SIZE;
use crate::model::{Booking, BookingFilters, MeetingRoom, RoomFilters, Span};
use crate::scheduler::conflict::conflicts;

fn paginate<T>(mut items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> (Vec<T>, usize) {
    let total = items.len();
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let skip = (page - 1).saturating_mul(limit);
    if skip >= items.len() {
        return (Vec::new(), total);
    }
    items.drain(..skip);
    items.truncate(limit);
    (items, total)
}

/// In-memory booking collection. Not a durability layer: a deployment that
/// needs persistence puts it behind this store, not inside it.
pub struct BookingStore {
    bookings: DashMap<Ulid, Booking>,
    /// Per-room serialization points for check-then-act write sequences.
    room_locks: DashMap<Ulid, Arc<Mutex<()>>>,
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            room_locks: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Insert or replace by id.
    pub fn insert(&self, booking: Booking) {
        self.bookings.insert(booking.id, booking);
    }

    pub fn get(&self, id: &Ulid) -> Option<Booking> {
        self.bookings.get(id).map(|e| e.value().clone())
    }

    pub fn remove(&self, id: &Ulid) -> Option<Booking> {
        self.bookings.remove(id).map(|(_, b)| b)
    }

    pub fn find_by_event_id(&self, event_id: &str) -> Option<Booking> {
        self.bookings
            .iter()
            .find(|e| e.value().event_id == event_id)
            .map(|e| e.value().clone())
    }

    /// Writers for the same room take this lock across their whole
    /// check-conflict / write-event / insert sequence, so each room is a
    /// single-writer queue.
    pub fn room_lock(&self, room_id: Ulid) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Non-cancelled bookings on `room_id` whose interval overlaps `span`,
    /// skipping `exclude` (a booking being re-validated against itself).
    /// Sorted by start time.
    pub fn find_conflicting(
        &self,
        room_id: Ulid,
        span: &Span,
        exclude: Option<Ulid>,
    ) -> Vec<Booking> {
        let mut hits: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| conflicts(e.value(), room_id, span, exclude))
            .map(|e| e.value().clone())
            .collect();
        hits.sort_by_key(|b| b.start_time);
        hits
    }

    /// Filtered listing sorted by start time, with pagination.
    /// Returns the page plus the pre-pagination total.
    pub fn find_many(&self, filters: &BookingFilters) -> (Vec<Booking>, usize) {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| Self::matches(e.value(), filters))
            .map(|e| e.value().clone())
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        paginate(bookings, filters.page, filters.limit)
    }

    /// All bookings touching `[start, end]`, unpaginated. Used for stats.
    pub fn in_range(
        &self,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| e.value().end_time >= start && e.value().start_time <= end)
            .map(|e| e.value().clone())
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        bookings
    }

    fn matches(booking: &Booking, filters: &BookingFilters) -> bool {
        if let Some(room_id) = filters.room_id
            && booking.room_id != room_id
        {
            return false;
        }
        if let Some(status) = filters.status
            && booking.status != status
        {
            return false;
        }
        if let Some(ref organizer) = filters.organizer
            && !booking
                .organizer
                .to_lowercase()
                .contains(&organizer.to_lowercase())
        {
            return false;
        }
        match (filters.start, filters.end) {
            (Some(start), Some(end)) => booking.end_time >= start && booking.start_time <= end,
            (Some(start), None) => booking.end_time >= start,
            (None, Some(end)) => booking.start_time <= end,
            (None, None) => true,
        }
    }
}

/// In-memory room directory.
pub struct RoomStore {
    rooms: DashMap<Ulid, MeetingRoom>,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn insert(&self, room: MeetingRoom) {
        self.rooms.insert(room.id, room);
    }

    pub fn get(&self, id: &Ulid) -> Option<MeetingRoom> {
        self.rooms.get(id).map(|e| e.value().clone())
    }

    pub fn remove(&self, id: &Ulid) -> Option<MeetingRoom> {
        self.rooms.remove(id).map(|(_, r)| r)
    }

    pub fn find_by_calendar_id(&self, calendar_id: &str) -> Option<MeetingRoom> {
        self.rooms
            .iter()
            .find(|e| e.value().calendar_id == calendar_id)
            .map(|e| e.value().clone())
    }

    /// True if an active room other than `exclude` already uses `name`
    /// (case-insensitive).
    pub fn active_name_taken(&self, name: &str, exclude: Option<Ulid>) -> bool {
        let lowered = name.to_lowercase();
        self.rooms.iter().any(|e| {
            let room = e.value();
            room.is_active && Some(room.id) != exclude && room.name.to_lowercase() == lowered
        })
    }

    /// Active rooms seating at least `min_capacity`, sorted by name.
    pub fn active_with_capacity(&self, min_capacity: u32) -> Vec<MeetingRoom> {
        let mut rooms: Vec<MeetingRoom> = self
            .rooms
            .iter()
            .filter(|e| e.value().is_active && e.value().capacity >= min_capacity)
            .map(|e| e.value().clone())
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        rooms
    }

    /// Filtered listing sorted by name, with pagination.
    pub fn find_many(&self, filters: &RoomFilters) -> (Vec<MeetingRoom>, usize) {
        let mut rooms: Vec<MeetingRoom> = self
            .rooms
            .iter()
            .filter(|e| Self::matches(e.value(), filters))
            .map(|e| e.value().clone())
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        paginate(rooms, filters.page, filters.limit)
    }

    fn matches(room: &MeetingRoom, filters: &RoomFilters) -> bool {
        if let Some(is_active) = filters.is_active
            && room.is_active != is_active
        {
            return false;
        }
        if let Some(min_capacity) = filters.min_capacity
            && room.capacity < min_capacity
        {
            return false;
        }
        filters
            .equipment
            .iter()
            .all(|wanted| room.equipment.iter().any(|have| have == wanted))
    }
}
