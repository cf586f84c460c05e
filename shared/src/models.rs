use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minutes assumed for an event that has no end when it is started.
pub const DEFAULT_TASK_MINUTES: i64 = 15;

/// Calendar event as seen by the task timer.
///
/// The `title` has the `(N mins)` annotation stripped; the annotation itself
/// is surfaced as `expected_duration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Summary exactly as stored on the calendar
    pub raw_title: String,
    /// Expected duration in minutes, `None` when the title carries no annotation
    pub expected_duration: Option<u32>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Start came from a date-only field
    pub all_day: bool,
    pub location: String,
    pub description: String,
    pub started: bool,
    pub finished: bool,
    /// The event has begun and may be finished
    pub endable: bool,
}

impl Event {
    /// Expected duration for display, `?` when unknown.
    pub fn duration_label(&self) -> String {
        match self.expected_duration {
            Some(minutes) => minutes.to_string(),
            None => "?".to_string(),
        }
    }
}

/// Task state kept alongside an event on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
}

impl EventAttributes {
    pub fn is_started(&self) -> bool {
        self.started.unwrap_or(false)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.unwrap_or(false)
    }
}
