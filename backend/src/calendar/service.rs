use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::Mutex;

use timer_shared::models::DEFAULT_TASK_MINUTES;
use timer_shared::{Event, EventAttributes};

use super::attributes;
use super::cache::EventCache;
use super::mapping;
use crate::clock::Clock;
use crate::google::types::{EventDateTime, GoogleEvent};
use crate::google::{CalendarProvider, EventQuery, ProviderError};

/// Largest listing window accepted on either side of now.
pub const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub cache_ttl: std::time::Duration,
    pub past_days: i64,
    pub future_days: i64,
    pub max_results: u32,
    /// Color applied to an event when it is finished
    pub completed_color_id: Option<String>,
    pub timezone: Tz,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_ttl: std::time::Duration::from_secs(5),
            past_days: 7,
            future_days: 1,
            max_results: 50,
            completed_color_id: None,
            timezone: Tz::UTC,
        }
    }
}

/// Task operations on top of a calendar provider, with a short-lived cache
/// of the event list.
///
/// The cache lock is never held across a provider call; concurrent misses may
/// both fetch.
pub struct CalendarService {
    provider: Arc<dyn CalendarProvider>,
    cache: Mutex<EventCache>,
    clock: Arc<dyn Clock>,
    settings: ServiceSettings,
}

impl CalendarService {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            provider,
            cache: Mutex::new(EventCache::new(settings.cache_ttl)),
            clock,
            settings,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Events starting within the configured window around now.
    ///
    /// Served from the cache while fresh. When the provider fails, any cached
    /// list is returned regardless of age.
    pub async fn list_upcoming(&self) -> Result<Vec<Event>, ProviderError> {
        let now = self.clock.now();

        let cached = self.cache.lock().await.fresh(now);
        if let Some(events) = cached {
            tracing::debug!("Event list served from cache");
            return Ok(refresh_endable(events, now));
        }

        let query = EventQuery {
            time_min: now - window_days(self.settings.past_days),
            time_max: now + window_days(self.settings.future_days),
            max_results: self.settings.max_results,
        };

        match self.provider.list_events(&query).await {
            Ok(raw) => {
                let events: Vec<Event> = raw
                    .iter()
                    .filter_map(|item| mapping::map_event(item, now, self.settings.timezone))
                    .collect();
                tracing::info!("Obtained {} events from Google Calendar", events.len());
                self.cache.lock().await.store(events.clone(), now);
                Ok(events)
            }
            Err(e) => {
                tracing::error!("Error obtaining events: {}", e);
                let stale = self.cache.lock().await.any();
                match stale {
                    Some(events) => {
                        tracing::warn!("Using cached events as fallback");
                        Ok(refresh_endable(events, now))
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Mark the event started and move it to begin now, keeping its length.
    pub async fn start_event(&self, event_id: &str) -> Result<Event, ProviderError> {
        let now = self.clock.now();
        let tz = self.settings.timezone;
        let mut raw = self.provider.get_event(event_id).await?;

        let length = mapping::original_duration(&raw, tz)
            .filter(|d| *d > Duration::zero())
            .unwrap_or_else(|| Duration::minutes(DEFAULT_TASK_MINUTES));

        let mut attrs = attributes::decode(&raw);
        attrs.started = Some(true);
        attributes::encode(&mut raw, attrs);

        raw.start = Some(moved(raw.start.as_ref(), now));
        raw.end = Some(moved(raw.end.as_ref(), now + length));

        let updated = self.provider.update_event(event_id, &raw).await?;
        self.clear_cache().await;
        tracing::info!("Started event {}", event_id);
        self.to_domain(&updated, event_id, now)
    }

    /// Mark the event finished and end it now.
    pub async fn finish_event(&self, event_id: &str) -> Result<Event, ProviderError> {
        let now = self.clock.now();
        let tz = self.settings.timezone;
        let mut raw = self.provider.get_event(event_id).await?;

        let mut attrs = attributes::decode(&raw);
        attrs.finished = Some(true);
        attributes::encode(&mut raw, attrs);

        // A timed end needs a timed start
        let timed_start = raw
            .start
            .as_ref()
            .filter(|start| start.date_time.is_none())
            .and_then(|start| {
                mapping::resolve(start, tz).map(|at| start.moved_to(at))
            });
        if let Some(start) = timed_start {
            raw.start = Some(start);
        }
        raw.end = Some(moved(raw.end.as_ref(), now));

        if let Some(color_id) = &self.settings.completed_color_id {
            raw.color_id = Some(color_id.clone());
        }

        let updated = self.provider.update_event(event_id, &raw).await?;
        self.clear_cache().await;
        tracing::info!("Finished event {}", event_id);
        self.to_domain(&updated, event_id, now)
    }

    /// Create a task starting now and lasting `minutes`.
    pub async fn create_event(&self, title: &str, minutes: u32) -> Result<Event, ProviderError> {
        let now = self.clock.now();

        let mut raw = GoogleEvent {
            summary: Some(mapping::annotated_title(title, minutes)),
            start: Some(EventDateTime::at(now)),
            end: Some(EventDateTime::at(
                now + Duration::minutes(i64::from(minutes)),
            )),
            ..Default::default()
        };
        attributes::encode(
            &mut raw,
            EventAttributes {
                started: None,
                finished: Some(false),
            },
        );

        let created = self.provider.insert_event(&raw).await?;
        self.clear_cache().await;
        let id = created.id.clone().unwrap_or_default();
        tracing::info!("Created event {}", id);

        if let Some(event) = mapping::map_event(&created, now, self.settings.timezone) {
            return Ok(event);
        }

        // The event exists remotely; describe it from what was sent
        tracing::warn!("Created event {} came back incomplete; using the request", id);
        raw.id = Some(id.clone());
        self.to_domain(&raw, &id, now)
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError> {
        self.provider.delete_event(event_id).await?;
        self.clear_cache().await;
        Ok(())
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        tracing::debug!("Event cache cleared");
    }

    fn to_domain(
        &self,
        raw: &GoogleEvent,
        event_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Event, ProviderError> {
        mapping::map_event(raw, now, self.settings.timezone).ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "event {} came back without an id or start",
                event_id
            ))
        })
    }
}

fn moved(existing: Option<&EventDateTime>, instant: DateTime<Utc>) -> EventDateTime {
    match existing {
        Some(when) => when.moved_to(instant),
        None => EventDateTime::at(instant),
    }
}

fn window_days(days: i64) -> Duration {
    Duration::try_days(days.clamp(0, MAX_WINDOW_DAYS)).unwrap_or_else(Duration::zero)
}

/// `endable` depends on the current time, so cached copies are re-evaluated.
fn refresh_endable(mut events: Vec<Event>, now: DateTime<Utc>) -> Vec<Event> {
    for event in &mut events {
        event.endable = event.start <= now;
    }
    events
}
