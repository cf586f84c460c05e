use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::calendar::CalendarService;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::google::{AuthClient, CalendarProvider, GoogleCalendarApi, GoogleEndpoints};
use crate::tokens::TokenStore;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub calendar: Arc<CalendarService>,
    pub auth: AuthClient,
    pub tokens: TokenStore,
    pub timezone: Tz,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::build(
            config,
            http,
            GoogleEndpoints::default(),
            Arc::new(SystemClock),
        ))
    }

    fn build(
        config: &AppConfig,
        http: reqwest::Client,
        endpoints: GoogleEndpoints,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenStore::new(config.token_file.clone());
        let auth = AuthClient::new(
            http.clone(),
            config.oauth_settings(),
            tokens.clone(),
            endpoints.clone(),
            clock.clone(),
        );
        let api = GoogleCalendarApi::new(
            http,
            auth.clone(),
            config.calendar_id.clone(),
            &endpoints,
        );

        Self::with_provider(config, auth, tokens, Arc::new(api), clock)
    }

    pub fn with_provider(
        config: &AppConfig,
        auth: AuthClient,
        tokens: TokenStore,
        provider: Arc<dyn CalendarProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let calendar = CalendarService::new(provider, clock, config.service_settings());
        Self {
            calendar: Arc::new(calendar),
            auth,
            tokens,
            timezone: config.timezone,
        }
    }
}
