use axum::{extract::State, response::Html};

use super::render;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::{IndexTemplate, ERROR_CALENDAR, ERROR_NO_CONFIG};

/// Task list grouped by day. Problems are rendered into the page rather than
/// returned as error statuses.
pub async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    if !state.tokens.exists().await {
        return render(&IndexTemplate::with_error(ERROR_NO_CONFIG));
    }

    let page = match state.calendar.list_upcoming().await {
        Ok(events) => IndexTemplate::with_events(events, state.calendar.now(), state.timezone),
        Err(e) => {
            tracing::error!("Error getting events: {}", e);
            IndexTemplate::with_error(ERROR_CALENDAR)
        }
    };

    render(&page)
}
