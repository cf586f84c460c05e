//! OAuth2 flow against Google: consent URL, code exchange and authorized
//! sessions that refresh and persist their own credentials.

use std::sync::Arc;

use super::types::TokenResponse;
use super::{GoogleEndpoints, ProviderError};
use crate::clock::Clock;
use crate::tokens::{TokenPair, TokenStore};

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Access tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_MS: i64 = 60_000;

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Request read-only calendar access instead of read-write
    pub readonly: bool,
}

impl OAuthSettings {
    pub fn scope(&self) -> &'static str {
        if self.readonly {
            CALENDAR_READONLY_SCOPE
        } else {
            CALENDAR_SCOPE
        }
    }
}

#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    settings: OAuthSettings,
    store: TokenStore,
    endpoints: GoogleEndpoints,
    clock: Arc<dyn Clock>,
}

impl AuthClient {
    pub fn new(
        http: reqwest::Client,
        settings: OAuthSettings,
        store: TokenStore,
        endpoints: GoogleEndpoints,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            settings,
            store,
            endpoints,
            clock,
        }
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Consent URL for the admin to visit. Always re-prompts so Google hands
    /// out a fresh refresh token.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             access_type=offline&\
             prompt=consent",
            self.endpoints.auth_url,
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.redirect_uri),
            urlencoding::encode(self.settings.scope()),
        )
    }

    /// Exchange an authorization code for a token pair and persist it.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, ProviderError> {
        let response = self
            .request_tokens(&[
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await
            .map_err(|e| {
                tracing::error!("Error obtaining tokens: {}", e);
                e
            })?;

        let tokens = response.into_token_pair(self.clock.now());
        if tokens.refresh_token.is_none() {
            tracing::warn!("No refresh token received; access will stop when the token expires");
        }

        self.store.save(&tokens).await?;
        Ok(tokens)
    }

    /// Open a session carrying the stored credentials.
    pub async fn authenticated(&self) -> Result<AuthorizedSession<'_>, ProviderError> {
        let tokens = self
            .store
            .load()
            .await?
            .ok_or(ProviderError::Unauthenticated)?;

        Ok(AuthorizedSession {
            client: self,
            loaded: tokens.clone(),
            current: tokens,
        })
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenResponse, ProviderError> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

/// Credentials loaded for one provider call.
///
/// The session refreshes its access token on demand; the caller checks back
/// in with [`AuthorizedSession::persist_if_refreshed`] once the call is done.
pub struct AuthorizedSession<'a> {
    client: &'a AuthClient,
    loaded: TokenPair,
    current: TokenPair,
}

impl AuthorizedSession<'_> {
    /// Bearer token for the next request, refreshed first if it is about to
    /// expire.
    pub async fn access_token(&mut self) -> Result<String, ProviderError> {
        if self.is_expired() {
            self.refresh().await?;
        }
        Ok(self.current.access_token.clone())
    }

    /// Persist the credentials if they changed since they were loaded.
    /// Returns whether anything was written.
    pub async fn persist_if_refreshed(&self) -> Result<bool, ProviderError> {
        if self.current == self.loaded {
            return Ok(false);
        }

        self.client.store.save(&self.current).await?;
        tracing::debug!("Persisted refreshed Google credentials");
        Ok(true)
    }

    fn is_expired(&self) -> bool {
        match self.current.expiry_date {
            Some(expiry) => self.client.clock.now().timestamp_millis() + EXPIRY_SKEW_MS >= expiry,
            None => false,
        }
    }

    async fn refresh(&mut self) -> Result<(), ProviderError> {
        let refresh_token = self
            .current
            .refresh_token
            .clone()
            .ok_or(ProviderError::Unauthenticated)?;

        let settings = &self.client.settings;
        let response = self
            .client
            .request_tokens(&[
                ("client_id", settings.client_id.as_str()),
                ("client_secret", settings.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await
            .map_err(|e| {
                tracing::error!("Failed to refresh Google access token: {}", e);
                e
            })?;

        let refreshed = response.into_token_pair(self.client.clock.now());
        self.current = self.current.merged_with(&refreshed);
        tracing::info!("Refreshed Google access token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3000/admin/oauth2callback".to_string(),
            readonly: false,
        }
    }

    fn test_client(base: &str, store: TokenStore) -> AuthClient {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        AuthClient::new(
            reqwest::Client::new(),
            test_settings(),
            store,
            GoogleEndpoints::with_base(base),
            Arc::new(FixedClock::new(now)),
        )
    }

    #[test]
    fn test_authorization_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("t.json"));
        let client = test_client("https://accounts.example", store);

        let url = client.authorization_url();
        assert!(url.starts_with("https://accounts.example/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fadmin%2Foauth2callback"
        ));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar&"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn test_readonly_scope() {
        let mut settings = test_settings();
        assert_eq!(settings.scope(), CALENDAR_SCOPE);
        settings.readonly = true;
        assert_eq!(settings.scope(), CALENDAR_READONLY_SCOPE);
    }

    #[tokio::test]
    async fn test_exchange_code_persists_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.fresh",
                "refresh_token": "1//refresh",
                "expires_in": 3599,
                "scope": CALENDAR_SCOPE,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let client = test_client(&server.uri(), store.clone());

        let tokens = client.exchange_code("auth-code").await.unwrap();
        assert_eq!(tokens.access_token, "ya29.fresh");
        assert_eq!(store.load().await.unwrap(), Some(tokens));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let client = test_client(&server.uri(), store.clone());

        let err = client.exchange_code("bad-code").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { status, .. } if status.as_u16() == 400
        ));
        assert!(!store.exists().await);
    }

    #[tokio::test]
    async fn test_authenticated_without_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client("http://unused", TokenStore::new(dir.path().join("tokens.json")));

        assert!(matches!(
            client.authenticated().await,
            Err(ProviderError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_is_not_refreshed() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let expiry = Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap();
        store
            .save(&TokenPair {
                access_token: "still-good".to_string(),
                refresh_token: Some("1//refresh".to_string()),
                expiry_date: Some(expiry.timestamp_millis()),
                ..Default::default()
            })
            .await
            .unwrap();

        let client = test_client("http://unused", store);
        let mut session = client.authenticated().await.unwrap();
        assert_eq!(session.access_token().await.unwrap(), "still-good");
        assert!(!session.persist_if_refreshed().await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_merged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.renewed",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let expired = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        store
            .save(&TokenPair {
                access_token: "stale".to_string(),
                refresh_token: Some("1//refresh".to_string()),
                expiry_date: Some(expired.timestamp_millis()),
                scope: Some(CALENDAR_SCOPE.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let client = test_client(&server.uri(), store.clone());
        let mut session = client.authenticated().await.unwrap();
        assert_eq!(session.access_token().await.unwrap(), "ya29.renewed");
        assert!(session.persist_if_refreshed().await.unwrap());

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.access_token, "ya29.renewed");
        assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(stored.scope.as_deref(), Some(CALENDAR_SCOPE));
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        store
            .save(&TokenPair {
                access_token: "stale".to_string(),
                expiry_date: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();

        let client = test_client("http://unused", store);
        let mut session = client.authenticated().await.unwrap();
        assert!(matches!(
            session.access_token().await,
            Err(ProviderError::Unauthenticated)
        ));
    }
}
