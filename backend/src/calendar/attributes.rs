//! Task state stored on the remote event.
//!
//! State lives in the event's private extended properties. Events written
//! before that carried it as a JSON object in the description; those are
//! still read, and the description is cleared the next time state is written.

use serde_json::{Map, Value};

use timer_shared::EventAttributes;

use crate::google::types::{ExtendedProperties, GoogleEvent};

pub const STARTED_KEY: &str = "timer.started";
pub const FINISHED_KEY: &str = "timer.finished";

const LEGACY_KEYS: [&str; 2] = ["started", "finished"];

/// Decode the task state of `event`. Never fails; anything unreadable is
/// treated as unset.
pub fn decode(event: &GoogleEvent) -> EventAttributes {
    let private = event
        .extended_properties
        .as_ref()
        .and_then(|props| props.private.as_ref());

    if let Some(private) = private {
        if private.contains_key(STARTED_KEY) || private.contains_key(FINISHED_KEY) {
            return EventAttributes {
                started: private.get(STARTED_KEY).and_then(|v| parse_flag(v)),
                finished: private.get(FINISHED_KEY).and_then(|v| parse_flag(v)),
            };
        }
    }

    event
        .description
        .as_deref()
        .map(decode_legacy)
        .unwrap_or_default()
}

/// Write `attrs` onto `event`, replacing any legacy description state.
pub fn encode(event: &mut GoogleEvent, attrs: EventAttributes) {
    let props = event
        .extended_properties
        .get_or_insert_with(ExtendedProperties::default);
    let private = props.private.get_or_insert_with(Default::default);

    for (key, value) in [(STARTED_KEY, attrs.started), (FINISHED_KEY, attrs.finished)] {
        match value {
            Some(flag) => {
                private.insert(key.to_string(), flag.to_string());
            }
            None => {
                private.remove(key);
            }
        }
    }

    if event
        .description
        .as_deref()
        .is_some_and(is_legacy_state)
    {
        event.description = None;
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn decode_legacy(description: &str) -> EventAttributes {
    serde_json::from_str(description.trim()).unwrap_or_default()
}

/// A description holding nothing but legacy task state.
fn is_legacy_state(description: &str) -> bool {
    match serde_json::from_str::<Map<String, Value>>(description.trim()) {
        Ok(map) => map.keys().all(|key| LEGACY_KEYS.contains(&key.as_str())),
        Err(_) => false,
    }
}
