//! Server-rendered pages.

use askama::Template;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use timer_shared::Event;

use crate::calendar::display::{self, DayGroup};

pub const ERROR_NO_CONFIG: &str = "no_config";
pub const ERROR_CALENDAR: &str = "calendar_error";

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Empty, `no_config` or `calendar_error`
    pub error: &'static str,
    pub days: Vec<DayView>,
}

impl IndexTemplate {
    pub fn with_error(error: &'static str) -> Self {
        Self {
            error,
            days: Vec::new(),
        }
    }

    pub fn with_events(events: Vec<Event>, now: DateTime<Utc>, tz: Tz) -> Self {
        let open = display::unfinished(events);
        let days = display::group_by_day(&open, now, tz)
            .into_iter()
            .map(|group| DayView::new(group, tz))
            .collect();
        Self {
            error: "",
            days,
        }
    }
}

pub struct DayView {
    pub label: String,
    pub date: String,
    pub events: Vec<EventView>,
}

impl DayView {
    fn new(group: DayGroup, tz: Tz) -> Self {
        Self {
            label: group.label,
            date: group.day.format("%d/%m/%Y").to_string(),
            events: group.events.iter().map(|e| EventView::new(e, tz)).collect(),
        }
    }
}

pub struct EventView {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub date: String,
    /// `HH:MM`, or `All day`
    pub time: String,
    pub location: String,
    pub description: String,
    pub started: bool,
    pub endable: bool,
}

impl EventView {
    fn new(event: &Event, tz: Tz) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            duration: event.duration_label(),
            date: display::format_date(event, tz),
            time: display::format_time(event, tz).unwrap_or_else(|| "All day".to_string()),
            location: event.location.clone(),
            description: event.description.clone(),
            started: event.started,
            endable: event.endable,
        }
    }
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub client_id: String,
    pub redirect_uri: String,
    pub has_tokens: bool,
    pub readonly: bool,
}
