mod availability;
mod bookings;
pub(crate) mod conflict;
mod error;
mod rooms;
mod slots;

pub use availability::{
    AvailabilityRequest, BulkAvailabilityOutcome, BulkAvailabilityRequest, RoomSuggestion,
};
pub use bookings::{BookingPatch, BookingRequest, BookingStats, CleanupOutcome, PeakHour};
pub use conflict::conflicts;
pub use error::SchedulerError;
pub use rooms::{NewRoom, RoomPatch};
pub use slots::generate_slots;

use std::sync::Arc;

use chrono::Duration;

use crate::limits::DEFAULT_SLOT_STEP_MINUTES;
use crate::model::WorkingHours;
use crate::provider::CalendarProvider;
use crate::store::{BookingStore, RoomStore};

/// Knobs for the availability computation. Slots overlap each other: a
/// start is emitted every `step_minutes` inside a gap, so a 60-minute
/// request in a free morning yields starts at 09:00, 09:15, 09:30 and so
/// on, not adjacent tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityConfig {
    pub working: WorkingHours,
    pub step_minutes: i64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            working: WorkingHours::default(),
            step_minutes: DEFAULT_SLOT_STEP_MINUTES,
        }
    }
}

impl AvailabilityConfig {
    /// Read overrides from `HUDDLE_DAY_START_HOUR`, `HUDDLE_DAY_END_HOUR`
    /// and `HUDDLE_SLOT_STEP_MINUTES`, falling back to defaults on missing
    /// or unusable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let start_hour = env_parse("HUDDLE_DAY_START_HOUR")
            .filter(|h| *h < 24)
            .unwrap_or(defaults.working.start_hour);
        let end_hour = env_parse("HUDDLE_DAY_END_HOUR")
            .filter(|h| *h < 24)
            .unwrap_or(defaults.working.end_hour);
        let working = if start_hour < end_hour {
            WorkingHours {
                start_hour,
                end_hour,
            }
        } else {
            defaults.working
        };
        let step_minutes = env_parse::<i64>("HUDDLE_SLOT_STEP_MINUTES")
            .filter(|m| *m > 0)
            .unwrap_or(defaults.step_minutes);
        Self {
            working,
            step_minutes,
        }
    }

    pub(crate) fn step(&self) -> Duration {
        Duration::minutes(self.step_minutes)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Booking, room and availability operations over in-memory stores and an
/// external calendar provider. Stores are created per instance, never
/// process-wide, so tests get isolation for free.
pub struct Scheduler {
    pub rooms: Arc<RoomStore>,
    pub bookings: Arc<BookingStore>,
    pub(crate) provider: Arc<dyn CalendarProvider>,
    pub(crate) config: AvailabilityConfig,
}

impl Scheduler {
    pub fn new(provider: Arc<dyn CalendarProvider>, config: AvailabilityConfig) -> Self {
        Self {
            rooms: Arc::new(RoomStore::new()),
            bookings: Arc::new(BookingStore::new()),
            provider,
            config,
        }
    }
}
