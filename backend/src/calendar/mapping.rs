use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

use timer_shared::Event;

use super::attributes;
use crate::google::types::{EventDateTime, GoogleEvent};

pub const UNTITLED: &str = "No title";

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)^(.*?)\s*\(\s*([0-9]+)\s*mins?\s*\)\s*$")
            .expect("duration pattern is a valid regex")
    })
}

/// Split a summary into its display title and the `(N mins)` duration.
pub fn parse_title(summary: Option<&str>) -> (String, Option<u32>) {
    let summary = summary.map(str::trim).unwrap_or_default();

    let annotated = duration_pattern().captures(summary).and_then(|caps| {
        let minutes = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some((caps.get(1).map_or("", |m| m.as_str()).trim(), minutes))
    });

    // An annotation that does not fit a u32 leaves the summary as it is
    let (title, duration) = match annotated {
        Some((title, minutes)) => (title, Some(minutes)),
        None => (summary, None),
    };

    if title.is_empty() {
        (UNTITLED.to_string(), duration)
    } else {
        (title.to_string(), duration)
    }
}

/// Summary for an event created by the timer.
pub fn annotated_title(title: &str, minutes: u32) -> String {
    format!("{} ({}mins)", title.trim(), minutes)
}

/// Resolve a start or end to an instant. Date-only values are midnight in `tz`.
pub fn resolve(when: &EventDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    if let Some(date_time) = when.date_time.as_deref() {
        return DateTime::parse_from_rfc3339(date_time)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(when.date.as_deref()?, "%Y-%m-%d").ok()?;
    tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `end - start` of the stored event, when both are known.
pub fn original_duration(event: &GoogleEvent, tz: Tz) -> Option<chrono::Duration> {
    let start = resolve(event.start.as_ref()?, tz)?;
    let end = resolve(event.end.as_ref()?, tz)?;
    Some(end - start)
}

/// Map a provider event to the timer's view of it. Returns `None` for events
/// without an id or a readable start.
pub fn map_event(raw: &GoogleEvent, now: DateTime<Utc>, tz: Tz) -> Option<Event> {
    let Some(id) = raw.id.clone() else {
        tracing::warn!("Skipping calendar event without an id");
        return None;
    };

    let Some(start) = raw.start.as_ref().and_then(|s| resolve(s, tz)) else {
        tracing::warn!("Skipping calendar event {} without a readable start", id);
        return None;
    };

    let all_day = raw
        .start
        .as_ref()
        .is_some_and(|s| s.date_time.is_none() && s.date.is_some());
    let (title, expected_duration) = parse_title(raw.summary.as_deref());
    let attrs = attributes::decode(raw);

    Some(Event {
        id,
        title,
        raw_title: raw.summary.clone().unwrap_or_default(),
        expected_duration,
        start,
        end: raw.end.as_ref().and_then(|e| resolve(e, tz)),
        all_day,
        location: raw.location.clone().unwrap_or_default(),
        description: raw.description.clone().unwrap_or_default(),
        started: attrs.is_started(),
        finished: attrs.is_finished(),
        endable: start <= now,
    })
}
