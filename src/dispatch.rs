//! Routing of inbound `/webhook` payloads by their declared `type`.

use serde_json::Value;

use crate::types::MessageEvent;

pub const VERIFICATION: &str = "verification";
pub const MESSAGE_CREATED: &str = "message-created";

/// Where an inbound webhook payload goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Registration handshake; the verifier owns the response.
    Verify { challenge: String },
    /// Chat message; handed to the trigger filter.
    Message(MessageEvent),
    /// Anything else: acknowledge with an empty 200 and stop.
    Ignore,
}

/// Classify a raw request body. Total: every input maps to a route.
pub fn classify(body: &[u8]) -> Route {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => route(&value),
        Err(_) => Route::Ignore,
    }
}

pub fn route(event: &Value) -> Route {
    match event.get("type").and_then(Value::as_str) {
        Some(VERIFICATION) => match str_field(event, "challenge") {
            Some(challenge) => Route::Verify { challenge },
            None => Route::Ignore,
        },
        Some(MESSAGE_CREATED) => {
            // Without a space there is nowhere to reply; skip before any token exchange.
            let content = str_field(event, "content");
            let space_id = str_field(event, "spaceId").filter(|id| !id.is_empty());
            match (content, space_id) {
                (Some(content), Some(space_id)) => {
                    Route::Message(MessageEvent { space_id, content })
                }
                _ => Route::Ignore,
            }
        }
        _ => Route::Ignore,
    }
}

fn str_field(event: &Value, key: &str) -> Option<String> {
    event.get(key).and_then(Value::as_str).map(str::to_string)
}
