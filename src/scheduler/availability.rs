use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;
use ulid::Ulid;

use crate::model::{AvailabilityDay, MeetingRoom, TimeSlot};
use crate::observability;
use crate::provider::Credentials;

use super::conflict::{validate_duration, validate_range};
use super::slots::generate_slots;
use super::{Scheduler, SchedulerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub room_ids: Vec<Ulid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// One sub-request of a bulk query. Duration and credentials are shared
/// across the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAvailabilityRequest {
    pub request_id: String,
    pub room_ids: Vec<Ulid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Outcome of one bulk sub-request. Failures are isolated: a failing entry
/// reports its error here and never aborts its siblings.
#[derive(Debug)]
pub struct BulkAvailabilityOutcome {
    pub request_id: String,
    pub outcome: Result<Vec<AvailabilityDay>, SchedulerError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSuggestion {
    pub room: MeetingRoom,
    pub score: i64,
    pub matching_equipment: Vec<String>,
}

impl Scheduler {
    /// Bookable slots per room per day over `[start, end]` inclusive.
    ///
    /// Unknown room ids are dropped; if none resolve the whole request fails
    /// with [`SchedulerError::NoValidRooms`]. Busy data for every resolved
    /// calendar is fetched in a single provider call. Days come back in date
    /// order, each day's slots sorted by start (stable, so simultaneous
    /// slots keep room resolution order).
    pub async fn availability(
        &self,
        creds: &Credentials,
        request: &AvailabilityRequest,
    ) -> Result<Vec<AvailabilityDay>, SchedulerError> {
        let started = std::time::Instant::now();
        metrics::counter!(observability::AVAILABILITY_QUERIES_TOTAL).increment(1);

        validate_duration(request.duration_minutes)?;
        validate_range(request.start, request.end)?;
        if request.room_ids.is_empty() {
            return Err(SchedulerError::Validation("at least one room id is required"));
        }

        let rooms: Vec<MeetingRoom> = request
            .room_ids
            .iter()
            .filter_map(|id| self.rooms.get(id))
            .collect();
        if rooms.is_empty() {
            return Err(SchedulerError::NoValidRooms);
        }

        let calendar_ids: Vec<String> = rooms.iter().map(|r| r.calendar_id.clone()).collect();
        let free_busy = self
            .provider
            .get_free_busy(creds, &calendar_ids, request.start, request.end)
            .await
            .inspect_err(|e| {
                metrics::counter!(observability::PROVIDER_FAILURES_TOTAL).increment(1);
                warn!("free/busy lookup failed: {e}");
            })?;

        let duration = Duration::minutes(request.duration_minutes);
        let step = self.config.step();

        let mut days = Vec::new();
        let last = request.end.date_naive();
        for date in request.start.date_naive().iter_days().take_while(|d| *d <= last) {
            let window = self.config.working.window_for(date);
            let mut day_slots: Vec<TimeSlot> = Vec::new();
            for room in &rooms {
                let busy = free_busy
                    .get(&room.calendar_id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                day_slots.extend(generate_slots(window, busy, duration, step, room.id));
            }
            day_slots.sort_by_key(|s| s.start);
            metrics::counter!(observability::SLOTS_EMITTED_TOTAL)
                .increment(day_slots.len() as u64);
            days.push(AvailabilityDay { date, slots: day_slots });
        }

        metrics::histogram!(observability::AVAILABILITY_QUERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        Ok(days)
    }

    /// Run several availability queries concurrently, one outcome per
    /// sub-request in input order, correlated by `request_id`.
    pub async fn bulk_availability(
        &self,
        creds: &Credentials,
        requests: &[BulkAvailabilityRequest],
        duration_minutes: i64,
    ) -> Vec<BulkAvailabilityOutcome> {
        let futures = requests.iter().map(|sub| async move {
            let request = AvailabilityRequest {
                room_ids: sub.room_ids.clone(),
                start: sub.start,
                end: sub.end,
                duration_minutes,
            };
            let outcome = self.availability(creds, &request).await;
            if let Err(ref e) = outcome {
                warn!(request_id = %sub.request_id, "bulk availability sub-request failed: {e}");
            }
            BulkAvailabilityOutcome {
                request_id: sub.request_id.clone(),
                outcome,
            }
        });
        join_all(futures).await
    }

    /// Rank active rooms that can host a `[start, end)` meeting for
    /// `required_capacity` people.
    ///
    /// Score: 10 points per matched preferred equipment item, plus a
    /// capacity-fit bonus of `max(0, 50 - oversize)`. Equal scores fall back
    /// to room id so the ordering is reproducible.
    pub async fn suggest_best_room(
        &self,
        creds: &Credentials,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        required_capacity: u32,
        preferred_equipment: &[String],
    ) -> Result<Vec<RoomSuggestion>, SchedulerError> {
        let candidates = self.rooms.active_with_capacity(required_capacity);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Whole minutes, rounding partial minutes up.
        let duration_minutes = ((end - start).num_seconds() + 59) / 60;
        let request = AvailabilityRequest {
            room_ids: candidates.iter().map(|r| r.id).collect(),
            start,
            end,
            duration_minutes,
        };
        let availability = self.availability(creds, &request).await?;

        let mut suggestions = Vec::new();
        for room in candidates {
            let covered = availability.iter().any(|day| {
                day.slots
                    .iter()
                    .any(|slot| slot.room_id == room.id && slot.start <= start && slot.end >= end)
            });
            if !covered {
                continue;
            }
            let matching_equipment: Vec<String> = preferred_equipment
                .iter()
                .filter(|wanted| room.equipment.iter().any(|have| have == *wanted))
                .cloned()
                .collect();
            let oversize = i64::from(room.capacity) - i64::from(required_capacity);
            let score = 10 * matching_equipment.len() as i64 + (50 - oversize).max(0);
            suggestions.push(RoomSuggestion {
                room,
                score,
                matching_equipment,
            });
        }
        suggestions.sort_by(|a, b| b.score.cmp(&a.score).then(a.room.id.cmp(&b.room.id)));
        Ok(suggestions)
    }
}
