use ulid::Ulid;

#[derive(Debug)]
pub enum SchedulerError {
    /// Malformed or out-of-range input. Never retried.
    Validation(&'static str),
    /// Referenced room or booking does not exist.
    NotFound(Ulid),
    /// None of the requested room ids resolved to a known room.
    NoValidRooms,
    /// Candidate interval overlaps the named non-cancelled booking.
    Conflict(Ulid),
    /// An active room already uses this name (case-insensitive).
    DuplicateName(String),
    /// A room already claims this external calendar.
    DuplicateCalendarId(String),
    /// The calendar provider call failed (network, auth, quota).
    Provider(String),
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::Validation(msg) => write!(f, "invalid request: {msg}"),
            SchedulerError::NotFound(id) => write!(f, "not found: {id}"),
            SchedulerError::NoValidRooms => write!(f, "no valid rooms found"),
            SchedulerError::Conflict(id) => {
                write!(f, "room is already booked: conflicts with {id}")
            }
            SchedulerError::DuplicateName(name) => {
                write!(f, "room with this name already exists: {name}")
            }
            SchedulerError::DuplicateCalendarId(calendar_id) => {
                write!(f, "room with this calendar id already exists: {calendar_id}")
            }
            SchedulerError::Provider(e) => write!(f, "calendar provider error: {e}"),
        }
    }
}

impl std::error::Error for SchedulerError {}
