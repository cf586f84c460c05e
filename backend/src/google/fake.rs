//! In-memory provider for service and router tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::api::{CalendarProvider, EventQuery};
use super::types::GoogleEvent;
use super::ProviderError;

#[derive(Debug, Default)]
pub struct FakeProvider {
    events: Mutex<BTreeMap<String, GoogleEvent>>,
    next_id: AtomicUsize,
    fail_list: AtomicBool,
    id_only_inserts: AtomicBool,
    last_query: Mutex<Option<EventQuery>>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<GoogleEvent>) -> Self {
        let fake = Self::new();
        for event in events {
            fake.put(event);
        }
        fake
    }

    pub fn put(&self, event: GoogleEvent) {
        let id = event.id.clone().unwrap_or_default();
        self.events.lock().unwrap().insert(id, event);
    }

    pub fn stored(&self, id: &str) -> Option<GoogleEvent> {
        self.events.lock().unwrap().get(id).cloned()
    }

    pub fn set_list_failure(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Answer inserts with a body carrying only the new id.
    pub fn set_id_only_inserts(&self, id_only: bool) {
        self.id_only_inserts.store(id_only, Ordering::SeqCst);
    }

    pub fn last_query(&self) -> Option<EventQuery> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        [
            &self.list_calls,
            &self.get_calls,
            &self.update_calls,
            &self.insert_calls,
            &self.delete_calls,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[async_trait]
impl CalendarProvider for FakeProvider {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<GoogleEvent>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ProviderError::InvalidResponse(
                "simulated list failure".to_string(),
            ));
        }
        Ok(self.events.lock().unwrap().values().cloned().collect())
    }

    async fn get_event(&self, event_id: &str) -> Result<GoogleEvent, ProviderError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.stored(event_id)
            .ok_or_else(|| ProviderError::NotFound(event_id.to_string()))
    }

    async fn update_event(
        &self,
        event_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ProviderError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut events = self.events.lock().unwrap();
        if !events.contains_key(event_id) {
            return Err(ProviderError::NotFound(event_id.to_string()));
        }
        let mut stored = event.clone();
        stored.id = Some(event_id.to_string());
        events.insert(event_id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn insert_event(&self, event: &GoogleEvent) -> Result<GoogleEvent, ProviderError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("fake-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut stored = event.clone();
        stored.id = Some(id.clone());
        self.events.lock().unwrap().insert(id.clone(), stored.clone());
        if self.id_only_inserts.load(Ordering::SeqCst) {
            return Ok(GoogleEvent {
                id: Some(id),
                ..Default::default()
            });
        }
        Ok(stored)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.events.lock().unwrap().remove(event_id) {
            Some(_) => Ok(()),
            None => Err(ProviderError::NotFound(event_id.to_string())),
        }
    }
}
