use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

// Fallback when neither the extraction payload nor the raw text yields a title.
pub const DEFAULT_TITLE: &str = "New event";

/// Structured scheduling request produced by intent extraction.
///
/// Exactly one of `explicit_start` / `day_constraint` may be set; when the
/// extraction payload carries both, the explicit start wins and the day
/// constraint is dropped before this struct is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingRequest {
    pub title: String,
    pub duration_minutes: i64,
    pub explicit_start: Option<DateTime<Utc>>,
    pub day_constraint: Option<NaiveDate>,
    pub earliest_allowed: DateTime<Utc>,
}

impl SchedulingRequest {
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }
}

/// One existing calendar commitment, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// Daily range open-search slots must fall inside, in the calendar's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub tz: Tz,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// The chosen slot. Computed once per request and handed straight to the
/// event materializer, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
}

/// Calendar backend's answer to a create-event call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventConfirmation {
    pub id: String,
    pub html_link: Option<String>,
}

/// Successful pipeline outcome: the slot we picked plus the backend's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub slot: ResolvedSlot,
    pub confirmation: EventConfirmation,
}

/// Raw shape of the extraction service's JSON answer. Every field is
/// optional at the wire level; validation happens in the intent service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AIScheduleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
}

/// Pipeline failure kinds. All are terminal for the current invocation;
/// retrying is a deliberate user re-invocation, never implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// No valid scheduling request could be derived from the text.
    Extraction(String),
    /// The calendar read failed or returned malformed busy data.
    Availability(String),
    /// The search completed and no conflict-free slot exists.
    NoSlot,
    /// A slot was found but the calendar write failed.
    Materialization(String),
}

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingError::Extraction(detail) => {
                write!(f, "could not understand the request: {}", detail)
            }
            SchedulingError::Availability(detail) => {
                write!(f, "could not check your calendar: {}", detail)
            }
            SchedulingError::NoSlot => write!(f, "no open slot found"),
            SchedulingError::Materialization(detail) => {
                write!(f, "found a slot but could not create the event: {}", detail)
            }
        }
    }
}

impl std::error::Error for SchedulingError {}
