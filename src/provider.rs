//! Seam to the external calendar service.
//!
//! The engine never inspects or refreshes credentials; they pass through
//! untouched. Free/busy lookups are batched: one call covers every calendar
//! in an availability request.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{BookingStatus, Span};
use crate::scheduler::SchedulerError;

/// Opaque bearer-token bundle handed through to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

/// Payload for event creation and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub recurrence: Vec<String>,
    pub status: BookingStatus,
}

/// An event as acknowledged by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Busy intervals per calendar over `[time_min, time_max]`. A calendar
    /// absent from the result has no busy periods in the window.
    async fn get_free_busy(
        &self,
        creds: &Credentials,
        calendar_ids: &[String],
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<HashMap<String, Vec<Span>>, SchedulerError>;

    async fn create_event(
        &self,
        creds: &Credentials,
        calendar_id: &str,
        event: &EventData,
    ) -> Result<CalendarEvent, SchedulerError>;

    async fn update_event(
        &self,
        creds: &Credentials,
        calendar_id: &str,
        event_id: &str,
        event: &EventData,
    ) -> Result<(), SchedulerError>;

    async fn delete_event(
        &self,
        creds: &Credentials,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), SchedulerError>;
}
