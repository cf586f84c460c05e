use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use timer_shared::api::{
    CreateEventRequest, EventIdRequest, EventResponse, EventsResponse, MessageResponse,
};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn api_root() -> Json<MessageResponse> {
    Json(MessageResponse::new("API is working"))
}

pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<EventsResponse>> {
    require_tokens(&state).await?;
    let events = state.calendar.list_upcoming().await?;
    Ok(Json(EventsResponse { events }))
}

pub async fn start_event(
    State(state): State<AppState>,
    payload: Result<Json<EventIdRequest>, JsonRejection>,
) -> ApiResult<Json<EventResponse>> {
    require_tokens(&state).await?;
    let Json(request) = payload?;
    let event_id = required_event_id(&request)?;

    let event = state.calendar.start_event(event_id).await?;
    Ok(Json(EventResponse { event }))
}

pub async fn finish_event(
    State(state): State<AppState>,
    payload: Result<Json<EventIdRequest>, JsonRejection>,
) -> ApiResult<Json<EventResponse>> {
    require_tokens(&state).await?;
    let Json(request) = payload?;
    let event_id = required_event_id(&request)?;

    let event = state.calendar.finish_event(event_id).await?;
    Ok(Json(EventResponse { event }))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> ApiResult<Json<EventResponse>> {
    require_tokens(&state).await?;
    let Json(request) = payload?;
    request.validate()?;

    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("title is required"))?;
    let minutes = request
        .expected_duration
        .ok_or_else(|| ApiError::bad_request("expectedDuration is required"))?;

    let event = state.calendar.create_event(title, minutes).await?;
    tracing::info!("Created task \"{}\" ({} mins)", event.title, minutes);
    Ok(Json(EventResponse { event }))
}

pub async fn delete_event(
    State(state): State<AppState>,
    payload: Result<Json<EventIdRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    require_tokens(&state).await?;
    let Json(request) = payload?;
    let event_id = required_event_id(&request)?;

    state.calendar.delete_event(event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

async fn require_tokens(state: &AppState) -> ApiResult<()> {
    if state.tokens.exists().await {
        Ok(())
    } else {
        Err(ApiError::Unauthenticated)
    }
}

fn required_event_id(request: &EventIdRequest) -> ApiResult<&str> {
    request
        .event_id()
        .ok_or_else(|| ApiError::bad_request("eventId is required"))
}
