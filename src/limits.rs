//! Bounds and defaults enforced at the request boundary.

/// Shortest meeting the slot generator will produce.
pub const MIN_DURATION_MINUTES: i64 = 15;

/// Longest meeting the slot generator will produce (8 hours).
pub const MAX_DURATION_MINUTES: i64 = 480;

/// Widest availability search window, in calendar days.
pub const MAX_QUERY_DAYS: i64 = 30;

/// Working window opens at this hour (local to the anchored date).
pub const DEFAULT_DAY_START_HOUR: u32 = 9;

/// Working window closes at this hour.
pub const DEFAULT_DAY_END_HOUR: u32 = 18;

/// Candidate slot starts are stepped at this granularity.
pub const DEFAULT_SLOT_STEP_MINUTES: i64 = 15;

/// Room names are capped to keep listings sane.
pub const MAX_NAME_LEN: usize = 100;

/// Page size applied when a listing request does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 50;
