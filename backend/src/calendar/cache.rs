use chrono::{DateTime, Utc};
use std::time::Duration;

use timer_shared::Event;

/// Single-slot cache of the last fetched event list.
#[derive(Debug)]
pub struct EventCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    events: Vec<Event>,
    captured_at: DateTime<Utc>,
}

impl EventCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cached events, if captured less than one TTL before `now`.
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<Vec<Event>> {
        let entry = self.entry.as_ref()?;
        let age = now.signed_duration_since(entry.captured_at).to_std().ok()?;
        (age < self.ttl).then(|| entry.events.clone())
    }

    /// Cached events regardless of age.
    pub fn any(&self) -> Option<Vec<Event>> {
        self.entry.as_ref().map(|entry| entry.events.clone())
    }

    pub fn store(&mut self, events: Vec<Event>, now: DateTime<Utc>) {
        self.entry = Some(CacheEntry {
            events,
            captured_at: now,
        });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
