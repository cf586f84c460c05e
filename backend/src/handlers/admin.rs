use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use timer_shared::api::{DisconnectResponse, OAuthCallbackQuery};

use super::render;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::AdminTemplate;

pub async fn admin_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let settings = state.auth.settings();
    render(&AdminTemplate {
        client_id: settings.client_id.clone(),
        redirect_uri: settings.redirect_uri.clone(),
        has_tokens: state.tokens.exists().await,
        readonly: settings.readonly,
    })
}

/// Start the OAuth flow.
pub async fn connect(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.auth.authorization_url())
}

/// Google OAuth callback. Exchanges the code and stores the token pair.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackQuery>,
) -> Response {
    if let Some(error) = &params.error {
        tracing::warn!("Authorization was not granted: {}", error);
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "No authorization code received").into_response();
    };

    match state.auth.exchange_code(code).await {
        Ok(_) => {
            state.calendar.clear_cache().await;
            tracing::info!("Google Calendar connected");
            Redirect::to("/admin?success=true").into_response()
        }
        Err(e) => {
            tracing::error!("Error in OAuth callback: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error completing authorization",
            )
                .into_response()
        }
    }
}

/// Forget the stored token pair.
pub async fn disconnect(State(state): State<AppState>) -> Response {
    match state.tokens.delete().await {
        Ok(()) => {
            state.calendar.clear_cache().await;
            Json(DisconnectResponse {
                success: true,
                message: "Disconnected successfully".to_string(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Error disconnecting: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DisconnectResponse {
                    success: false,
                    message: "Error disconnecting".to_string(),
                }),
            )
                .into_response()
        }
    }
}
