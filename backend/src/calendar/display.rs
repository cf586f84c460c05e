//! Presentation helpers. Nothing here is persisted.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

use timer_shared::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub label: String,
    pub events: Vec<Event>,
}

/// Calendar day of the event's start in `tz`.
pub fn day_key(event: &Event, tz: Tz) -> NaiveDate {
    event.start.with_timezone(&tz).date_naive()
}

pub fn relative_day_label(day: NaiveDate, today: NaiveDate) -> String {
    match (day - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        n if n > 1 => format!("In {} days", n),
        n => format!("{} days ago", -n),
    }
}

/// Group events by start day, days ascending. Order within a day is kept.
pub fn group_by_day(events: &[Event], now: DateTime<Utc>, tz: Tz) -> Vec<DayGroup> {
    let today = now.with_timezone(&tz).date_naive();
    let mut days: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        days.entry(day_key(event, tz)).or_default().push(event.clone());
    }

    days.into_iter()
        .map(|(day, events)| DayGroup {
            day,
            label: relative_day_label(day, today),
            events,
        })
        .collect()
}

pub fn unfinished(events: Vec<Event>) -> Vec<Event> {
    events.into_iter().filter(|e| !e.finished).collect()
}

/// `dd/mm/yyyy` in `tz`.
pub fn format_date(event: &Event, tz: Tz) -> String {
    event.start.with_timezone(&tz).format("%d/%m/%Y").to_string()
}

/// `HH:MM` in `tz`; all-day events have no time.
pub fn format_time(event: &Event, tz: Tz) -> Option<String> {
    if event.all_day {
        return None;
    }
    Some(event.start.with_timezone(&tz).format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, start: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            title: id.to_string(),
            raw_title: id.to_string(),
            expected_duration: Some(15),
            start,
            end: None,
            all_day: false,
            location: String::new(),
            description: String::new(),
            started: false,
            finished: false,
            endable: false,
        }
    }

    #[test]
    fn test_relative_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        assert_eq!(relative_day_label(day(10), today), "Today");
        assert_eq!(relative_day_label(day(11), today), "Tomorrow");
        assert_eq!(relative_day_label(day(9), today), "Yesterday");
        assert_eq!(relative_day_label(day(13), today), "In 3 days");
        assert_eq!(relative_day_label(day(3), today), "7 days ago");
    }

    #[test]
    fn test_group_by_day_is_ascending() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let events = vec![
            event("late", Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap()),
            event("early", Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap()),
            event("noon", Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()),
            event("eve", Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap()),
        ];

        let groups = group_by_day(&events, now, Tz::UTC);
        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["Yesterday", "Today", "Tomorrow"]);

        let today: Vec<_> = groups[1].events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(today, ["noon", "eve"]);
    }

    #[test]
    fn test_grouping_uses_configured_zone() {
        // 23:30 UTC is already the next day in Madrid
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let late = event("late", Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap());

        let groups = group_by_day(&[late], now, chrono_tz::Europe::Madrid);
        assert_eq!(groups[0].label, "Tomorrow");
    }

    #[test]
    fn test_unfinished_drops_finished() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let mut done = event("done", start);
        done.finished = true;

        let left = unfinished(vec![done, event("open", start)]);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "open");
    }

    #[test]
    fn test_format_date_and_time() {
        let mut e = event("e", Utc.with_ymd_and_hms(2024, 3, 5, 7, 5, 0).unwrap());
        assert_eq!(format_date(&e, Tz::UTC), "05/03/2024");
        assert_eq!(format_time(&e, Tz::UTC).as_deref(), Some("07:05"));

        e.all_day = true;
        assert_eq!(format_time(&e, Tz::UTC), None);
    }
}
