use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Event;

// ============================================================================
// Event API Types
// ============================================================================

/// Body of `POST /api/start`, `POST /api/finish` and `DELETE /api/delete`.
///
/// Fields are optional so a missing id is reported as a 400 by the handler
/// rather than as a deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventIdRequest {
    #[serde(default)]
    pub event_id: Option<String>,
}

impl EventIdRequest {
    /// Non-blank event id, if one was supplied.
    pub fn event_id(&self) -> Option<&str> {
        self.event_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,

    /// Expected duration in minutes
    #[serde(default)]
    #[validate(range(min = 1, max = 1440))]
    pub expected_duration: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub event: Event,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Admin API Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_request_rejects_blank() {
        let request: EventIdRequest = serde_json::from_str(r#"{"eventId": "   "}"#).unwrap();
        assert_eq!(request.event_id(), None);

        let request: EventIdRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.event_id(), None);

        let request: EventIdRequest = serde_json::from_str(r#"{"eventId": "abc"}"#).unwrap();
        assert_eq!(request.event_id(), Some("abc"));
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateEventRequest {
            title: Some("Review PR".to_string()),
            expected_duration: Some(25),
        };
        assert!(request.validate().is_ok());

        let request = CreateEventRequest {
            title: Some("Review PR".to_string()),
            expected_duration: Some(0),
        };
        assert!(request.validate().is_err());

        let request = CreateEventRequest {
            title: Some("x".repeat(501)),
            expected_duration: Some(10),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("Event not found")).unwrap();
        assert_eq!(json, r#"{"error":"Event not found"}"#);
    }
}
