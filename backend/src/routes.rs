use axum::{
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, api, health, index};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api::api_root))
        .route("/events", get(api::list_events))
        .route("/start", post(api::start_event))
        .route("/finish", post(api::finish_event))
        .route("/create", post(api::create_event))
        .route("/delete", delete(api::delete_event))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::admin_page))
        .route("/connect", get(admin::connect))
        .route("/oauth2callback", get(admin::oauth_callback))
        .route("/disconnect", post(admin::disconnect))
}

/// Full application: pages, JSON API and static assets from `public_dir`.
pub fn create_app(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .nest("/admin", admin_routes())
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
