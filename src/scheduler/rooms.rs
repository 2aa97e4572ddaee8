use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use ulid::Ulid;

use crate::limits::MAX_NAME_LEN;
use crate::model::{MeetingRoom, RoomFilters};

use super::{Scheduler, SchedulerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub name: String,
    pub calendar_id: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: u32,
    pub equipment: Vec<String>,
    pub time_zone: String,
}

/// Partial room update. `calendar_id` is deliberately absent: a room stays
/// bound to its calendar for life, otherwise existing bookings would point
/// at events in a calendar the room no longer owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub equipment: Option<Vec<String>>,
    pub time_zone: Option<String>,
    pub is_active: Option<bool>,
}

fn validate_name(name: &str) -> Result<(), SchedulerError> {
    if name.is_empty() {
        return Err(SchedulerError::Validation("room name is required"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(SchedulerError::Validation("room name is too long"));
    }
    Ok(())
}

impl Scheduler {
    /// Register a room. Name must be unique among active rooms
    /// (case-insensitive) and each external calendar belongs to at most one
    /// room.
    pub fn create_room(&self, new: NewRoom) -> Result<MeetingRoom, SchedulerError> {
        validate_name(&new.name)?;
        if new.capacity == 0 {
            return Err(SchedulerError::Validation("capacity must be at least 1"));
        }
        if self.rooms.active_name_taken(&new.name, None) {
            return Err(SchedulerError::DuplicateName(new.name));
        }
        if self.rooms.find_by_calendar_id(&new.calendar_id).is_some() {
            return Err(SchedulerError::DuplicateCalendarId(new.calendar_id));
        }

        let now = Utc::now();
        let room = MeetingRoom {
            id: Ulid::new(),
            name: new.name,
            calendar_id: new.calendar_id,
            description: new.description,
            location: new.location,
            capacity: new.capacity,
            equipment: new.equipment,
            time_zone: new.time_zone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.rooms.insert(room.clone());
        info!(room_id = %room.id, name = %room.name, "room created");
        Ok(room)
    }

    pub fn get_room(&self, id: &Ulid) -> Option<MeetingRoom> {
        self.rooms.get(id)
    }

    pub fn room_by_calendar_id(&self, calendar_id: &str) -> Option<MeetingRoom> {
        self.rooms.find_by_calendar_id(calendar_id)
    }

    /// Filtered listing plus pre-pagination total, sorted by name.
    pub fn list_rooms(&self, filters: &RoomFilters) -> (Vec<MeetingRoom>, usize) {
        self.rooms.find_many(filters)
    }

    pub fn update_room(&self, id: Ulid, patch: RoomPatch) -> Result<MeetingRoom, SchedulerError> {
        let mut room = self.rooms.get(&id).ok_or(SchedulerError::NotFound(id))?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            if self.rooms.active_name_taken(&name, Some(id)) {
                return Err(SchedulerError::DuplicateName(name));
            }
            room.name = name;
        }
        if let Some(capacity) = patch.capacity {
            if capacity == 0 {
                return Err(SchedulerError::Validation("capacity must be at least 1"));
            }
            room.capacity = capacity;
        }
        if let Some(description) = patch.description {
            room.description = Some(description);
        }
        if let Some(location) = patch.location {
            room.location = Some(location);
        }
        if let Some(equipment) = patch.equipment {
            room.equipment = equipment;
        }
        if let Some(time_zone) = patch.time_zone {
            room.time_zone = time_zone;
        }
        if let Some(is_active) = patch.is_active {
            room.is_active = is_active;
        }
        room.updated_at = Utc::now();

        self.rooms.insert(room.clone());
        info!(room_id = %id, "room updated");
        Ok(room)
    }

    pub fn delete_room(&self, id: Ulid) -> Result<MeetingRoom, SchedulerError> {
        let removed = self.rooms.remove(&id).ok_or(SchedulerError::NotFound(id))?;
        info!(room_id = %id, name = %removed.name, "room deleted");
        Ok(removed)
    }
}
