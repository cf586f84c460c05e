use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, Response, StatusCode};

use super::auth::AuthClient;
use super::types::{EventList, GoogleEvent};
use super::{GoogleEndpoints, ProviderError};

/// Window of events to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub max_results: u32,
}

/// Remote calendar operations used by the calendar service.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Single instances of events starting inside the window, ordered by start.
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<GoogleEvent>, ProviderError>;

    async fn get_event(&self, event_id: &str) -> Result<GoogleEvent, ProviderError>;

    /// Replace the stored event with `event`.
    async fn update_event(
        &self,
        event_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ProviderError>;

    async fn insert_event(&self, event: &GoogleEvent) -> Result<GoogleEvent, ProviderError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError>;
}

/// Client for the Google Calendar v3 REST API
pub struct GoogleCalendarApi {
    http: reqwest::Client,
    auth: AuthClient,
    calendar_id: String,
    api_base: String,
}

impl GoogleCalendarApi {
    pub fn new(
        http: reqwest::Client,
        auth: AuthClient,
        calendar_id: impl Into<String>,
        endpoints: &GoogleEndpoints,
    ) -> Self {
        Self {
            http,
            auth,
            calendar_id: calendar_id.into(),
            api_base: endpoints.calendar_api.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    /// Send one authorized request. Refreshed credentials are written back
    /// whether or not the request itself succeeded.
    async fn call(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<&GoogleEvent>,
        event_id: Option<&str>,
    ) -> Result<Response, ProviderError> {
        let mut session = self.auth.authenticated().await?;
        let token = session.access_token().await?;

        let mut request = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = request.send().await;

        if let Err(e) = session.persist_if_refreshed().await {
            tracing::error!("Failed to persist refreshed tokens: {}", e);
        }

        let response = result?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if let Some(id) = event_id {
            if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
                return Err(ProviderError::NotFound(id.to_string()));
            }
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        Err(ProviderError::Status { status, body })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarApi {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<GoogleEvent>, ProviderError> {
        let params = [
            (
                "timeMin",
                query.time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "timeMax",
                query.time_max.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", query.max_results.to_string()),
        ];

        let response = self
            .call(Method::GET, self.events_url(), &params, None, None)
            .await?;
        let list: EventList = response.json().await?;
        Ok(list.items)
    }

    async fn get_event(&self, event_id: &str) -> Result<GoogleEvent, ProviderError> {
        let response = self
            .call(
                Method::GET,
                self.event_url(event_id),
                &[],
                None,
                Some(event_id),
            )
            .await?;
        Ok(response.json().await?)
    }

    async fn update_event(
        &self,
        event_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ProviderError> {
        let response = self
            .call(
                Method::PUT,
                self.event_url(event_id),
                &[],
                Some(event),
                Some(event_id),
            )
            .await?;
        Ok(response.json().await?)
    }

    async fn insert_event(&self, event: &GoogleEvent) -> Result<GoogleEvent, ProviderError> {
        let response = self
            .call(Method::POST, self.events_url(), &[], Some(event), None)
            .await?;
        let created: GoogleEvent = response.json().await?;
        tracing::info!("Created calendar event (id: {:?})", created.id);
        Ok(created)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ProviderError> {
        self.call(
            Method::DELETE,
            self.event_url(event_id),
            &[],
            None,
            Some(event_id),
        )
        .await?;
        tracing::info!("Deleted calendar event: {}", event_id);
        Ok(())
    }
}
