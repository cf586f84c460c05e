use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::calendar::service::MAX_WINDOW_DAYS;
use crate::calendar::ServiceSettings;
use crate::google::auth::OAuthSettings;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub calendar_id: String,
    pub readonly_scope: bool,
    pub completed_color_id: Option<String>,
    pub token_file: PathBuf,
    pub cache_ttl: Duration,
    pub past_days: i64,
    pub future_days: i64,
    pub max_results: u32,
    pub timezone: Tz,
    pub public_dir: PathBuf,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: parse_or("PORT", 3000)?,
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .context("GOOGLE_CLIENT_ID must be set")?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .context("GOOGLE_CLIENT_SECRET must be set")?,
            google_redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                .context("GOOGLE_REDIRECT_URI must be set")?,
            calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "primary".to_string()),
            readonly_scope: parse_or("GOOGLE_CALENDAR_READONLY", false)?,
            completed_color_id: env::var("COMPLETED_EVENT_COLOR_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            token_file: env::var("TOKEN_FILE")
                .unwrap_or_else(|_| "tokens.json".to_string())
                .into(),
            cache_ttl: Duration::from_secs(parse_or("CACHE_TTL_SECS", 5)?),
            past_days: window_days("EVENTS_PAST_DAYS", 7)?,
            future_days: window_days("EVENTS_FUTURE_DAYS", 1)?,
            max_results: parse_or("EVENTS_MAX_RESULTS", 50)?,
            timezone: env::var("TIMEZONE")
                .unwrap_or_else(|_| "UTC".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("TIMEZONE must be an IANA zone name: {}", e))?,
            public_dir: env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),
            http_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 30)?),
        })
    }

    pub fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            client_id: self.google_client_id.clone(),
            client_secret: self.google_client_secret.clone(),
            redirect_uri: self.google_redirect_uri.clone(),
            readonly: self.readonly_scope,
        }
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            cache_ttl: self.cache_ttl,
            past_days: self.past_days,
            future_days: self.future_days,
            max_results: self.max_results,
            completed_color_id: self.completed_color_id.clone(),
            timezone: self.timezone,
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a valid value: {}", name, e)),
        _ => Ok(default),
    }
}

/// A listing window in days, bounded so it always fits a `chrono::Duration`.
fn window_days(name: &str, default: i64) -> Result<i64> {
    let days = parse_or(name, default)?;
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        anyhow::bail!(
            "{} must be between 0 and {}, got {}",
            name,
            MAX_WINDOW_DAYS,
            days
        );
    }
    Ok(days)
}
