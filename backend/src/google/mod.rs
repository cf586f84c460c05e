//! Google Calendar REST and OAuth2 plumbing.
//!
//! Calls go straight to the REST endpoints with `reqwest` so the token
//! lifecycle stays explicit: every provider call builds an authorized session
//! from the token store, refreshes the access token when it is near expiry and
//! writes refreshed credentials back once the call returns.

pub mod api;
pub mod auth;
#[cfg(test)]
pub mod fake;
pub mod types;

use reqwest::StatusCode;
use thiserror::Error;

use crate::tokens::TokenStoreError;

pub use api::{CalendarProvider, EventQuery, GoogleCalendarApi};
pub use auth::AuthClient;

/// Errors raised while talking to Google.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No token pair has been stored yet, or it can no longer be refreshed
    #[error("no usable Google credentials; run the OAuth flow first")]
    Unauthenticated,

    #[error("event {0} not found")]
    NotFound(String),

    #[error("Google returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request to Google failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),

    #[error("unexpected response from Google: {0}")]
    InvalidResponse(String),
}

/// Base URLs of the Google services this crate talks to.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub calendar_api: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            calendar_api: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Point every endpoint at one host, e.g. a local mock server.
    #[cfg(test)]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{}/o/oauth2/v2/auth", base),
            token_url: format!("{}/token", base),
            calendar_api: format!("{}/calendar/v3", base),
        }
    }
}
