//! Meeting-room availability and booking engine.
//!
//! Computes bookable time slots from externally supplied free/busy data,
//! detects booking conflicts, and ranks rooms for a requested meeting.
//! Event persistence is delegated to a [`provider::CalendarProvider`];
//! HTTP routing and token handling live in outer layers.

pub mod limits;
pub mod model;
pub mod observability;
pub mod provider;
pub mod scheduler;
pub mod store;
