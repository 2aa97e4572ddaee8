use std::collections::HashMap;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ulid::Ulid;

use crate::model::{Booking, BookingFilters, BookingStatus, Span};
use crate::observability;
use crate::provider::{Credentials, EventData};

use super::conflict::validate_times;
use super::{Scheduler, SchedulerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub room_id: Ulid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub organizer: String,
    pub attendees: Vec<String>,
    pub recurrence: Vec<String>,
}

/// Partial update. Absent fields keep their current value; changed times
/// re-run the conflict check against everything except the booking itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub attendees: Option<Vec<String>>,
    pub status: Option<BookingStatus>,
}

/// Result of the remote half of a delete. The local deletion always goes
/// through; callers observe here whether the calendar event was actually
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakHour {
    pub hour: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total_bookings: usize,
    pub confirmed_bookings: usize,
    pub tentative_bookings: usize,
    pub cancelled_bookings: usize,
    pub average_duration_minutes: i64,
    pub peak_hours: Vec<PeakHour>,
}

impl Scheduler {
    /// Create a booking: conflict check, calendar event creation, then local
    /// insert, all under the room's write lock so concurrent requests for
    /// the same room are serialized.
    pub async fn create_booking(
        &self,
        creds: &Credentials,
        request: BookingRequest,
    ) -> Result<Booking, SchedulerError> {
        validate_times(request.start_time, request.end_time)?;
        if request.title.is_empty() {
            return Err(SchedulerError::Validation("title is required"));
        }
        let room = self
            .rooms
            .get(&request.room_id)
            .ok_or(SchedulerError::NotFound(request.room_id))?;

        let lock = self.bookings.room_lock(room.id);
        let _guard = lock.lock().await;

        let span = Span::new(request.start_time, request.end_time);
        if let Some(existing) = self.bookings.find_conflicting(room.id, &span, None).first() {
            metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(SchedulerError::Conflict(existing.id));
        }

        let event = EventData {
            summary: request.title.clone(),
            description: request.description.clone(),
            start: request.start_time,
            end: request.end_time,
            attendees: request.attendees.clone(),
            recurrence: request.recurrence.clone(),
            status: BookingStatus::Confirmed,
        };
        let created = self
            .provider
            .create_event(creds, &room.calendar_id, &event)
            .await
            .inspect_err(|e| {
                metrics::counter!(observability::PROVIDER_FAILURES_TOTAL).increment(1);
                warn!(room_id = %room.id, "calendar event creation failed: {e}");
            })?;

        let now = Utc::now();
        let booking = Booking {
            id: Ulid::new(),
            event_id: created.id,
            calendar_id: room.calendar_id.clone(),
            room_id: room.id,
            title: request.title,
            description: request.description,
            start_time: request.start_time,
            end_time: request.end_time,
            organizer: request.organizer,
            attendees: request.attendees,
            status: BookingStatus::Confirmed,
            recurring_event_id: None,
            is_recurring: !request.recurrence.is_empty(),
            created_at: now,
            updated_at: now,
        };
        self.bookings.insert(booking.clone());
        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(booking_id = %booking.id, room_id = %booking.room_id, "booking created");
        Ok(booking)
    }

    pub async fn update_booking(
        &self,
        creds: &Credentials,
        id: Ulid,
        patch: BookingPatch,
    ) -> Result<Booking, SchedulerError> {
        let room_id = self
            .bookings
            .get(&id)
            .ok_or(SchedulerError::NotFound(id))?
            .room_id;

        let lock = self.bookings.room_lock(room_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; the booking may have changed or vanished.
        let existing = self.bookings.get(&id).ok_or(SchedulerError::NotFound(id))?;

        let start = patch.start_time.unwrap_or(existing.start_time);
        let end = patch.end_time.unwrap_or(existing.end_time);
        validate_times(start, end)?;

        if patch.start_time.is_some() || patch.end_time.is_some() {
            let span = Span::new(start, end);
            if let Some(other) = self
                .bookings
                .find_conflicting(existing.room_id, &span, Some(id))
                .first()
            {
                metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                return Err(SchedulerError::Conflict(other.id));
            }
        }

        let mut updated = existing;
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(description) = patch.description {
            updated.description = Some(description);
        }
        updated.start_time = start;
        updated.end_time = end;
        if let Some(attendees) = patch.attendees {
            updated.attendees = attendees;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        updated.updated_at = Utc::now();

        let event = EventData {
            summary: updated.title.clone(),
            description: updated.description.clone(),
            start,
            end,
            attendees: updated.attendees.clone(),
            recurrence: Vec::new(),
            status: updated.status,
        };
        self.provider
            .update_event(creds, &updated.calendar_id, &updated.event_id, &event)
            .await
            .inspect_err(|e| {
                metrics::counter!(observability::PROVIDER_FAILURES_TOTAL).increment(1);
                warn!(booking_id = %id, "calendar event update failed: {e}");
            })?;

        self.bookings.insert(updated.clone());
        metrics::counter!(observability::BOOKINGS_UPDATED_TOTAL).increment(1);
        info!(booking_id = %id, "booking updated");
        Ok(updated)
    }

    /// Delete a booking, removing its calendar event first. The remote
    /// deletion is best-effort: a provider failure is logged and reported in
    /// the returned [`CleanupOutcome`], and the local record is removed
    /// either way so state never gets stuck behind a dead calendar.
    pub async fn delete_booking(
        &self,
        creds: &Credentials,
        id: Ulid,
    ) -> Result<(Booking, CleanupOutcome), SchedulerError> {
        let existing = self.bookings.get(&id).ok_or(SchedulerError::NotFound(id))?;

        let cleanup = match self
            .provider
            .delete_event(creds, &existing.calendar_id, &existing.event_id)
            .await
        {
            Ok(()) => CleanupOutcome::Completed,
            Err(e) => {
                metrics::counter!(observability::CALENDAR_CLEANUP_FAILURES_TOTAL).increment(1);
                warn!(booking_id = %id, "calendar event deletion failed, deleting booking anyway: {e}");
                CleanupOutcome::Failed(e.to_string())
            }
        };

        let removed = self.bookings.remove(&id).ok_or(SchedulerError::NotFound(id))?;
        metrics::counter!(observability::BOOKINGS_DELETED_TOTAL).increment(1);
        info!(booking_id = %id, "booking deleted");
        Ok((removed, cleanup))
    }

    pub fn get_booking(&self, id: &Ulid) -> Option<Booking> {
        self.bookings.get(id)
    }

    pub fn booking_by_event_id(&self, event_id: &str) -> Option<Booking> {
        self.bookings.find_by_event_id(event_id)
    }

    /// Filtered listing plus pre-pagination total, sorted by start time.
    pub fn list_bookings(&self, filters: &BookingFilters) -> (Vec<Booking>, usize) {
        self.bookings.find_many(filters)
    }

    pub fn find_conflicting(
        &self,
        room_id: Ulid,
        span: &Span,
        exclude: Option<Ulid>,
    ) -> Vec<Booking> {
        self.bookings.find_conflicting(room_id, span, exclude)
    }

    /// Next confirmed bookings starting from now.
    pub fn upcoming_bookings(&self, limit: usize) -> Vec<Booking> {
        let filters = BookingFilters {
            start: Some(Utc::now()),
            status: Some(BookingStatus::Confirmed),
            limit: Some(limit),
            ..Default::default()
        };
        self.bookings.find_many(&filters).0
    }

    /// Aggregate counts over bookings touching `[start, end]`.
    pub fn booking_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingStats {
        let bookings = self.bookings.in_range(start, end);

        let confirmed = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count();
        let tentative = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Tentative)
            .count();
        let cancelled = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Cancelled)
            .count();

        let average_duration_minutes = if bookings.is_empty() {
            0
        } else {
            let total_secs: i64 = bookings
                .iter()
                .map(|b| (b.end_time - b.start_time).num_seconds())
                .sum();
            ((total_secs as f64 / bookings.len() as f64) / 60.0).round() as i64
        };

        let mut by_hour: HashMap<u32, usize> = HashMap::new();
        for booking in &bookings {
            *by_hour.entry(booking.start_time.hour()).or_default() += 1;
        }
        let mut peak_hours: Vec<PeakHour> = by_hour
            .into_iter()
            .map(|(hour, count)| PeakHour { hour, count })
            .collect();
        peak_hours.sort_by(|a, b| b.count.cmp(&a.count).then(a.hour.cmp(&b.hour)));
        peak_hours.truncate(5);

        BookingStats {
            total_bookings: bookings.len(),
            confirmed_bookings: confirmed,
            tentative_bookings: tentative,
            cancelled_bookings: cancelled,
            average_duration_minutes,
            peak_hours,
        }
    }
}
