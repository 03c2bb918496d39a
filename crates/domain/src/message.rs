//! Live-channel message shapes.
//!
//! Outbound: `{ "messageType": "propertyStatus" | "event" | "actionStatus" | "error", "data": {...} }`.
//! Inbound: `setProperty`, `requestAction` and `addEventSubscription`.

use serde::Deserialize;
use serde_json::{Map, Value as Json, json};

use crate::error::ValidationError;
use crate::time::{self, Timestamp};
use crate::value::Value;

/// A notification pushed to attached subscriber channels.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// A property accepted a new value.
    PropertyStatus { name: String, value: Value },
    /// An event occurred.
    Event {
        name: String,
        payload: Value,
        timestamp: Timestamp,
    },
    /// An action instance changed status; `descriptor` is its wire descriptor.
    ActionStatus { descriptor: Json },
    /// Answer to a rejected inbound message, sent to its channel only.
    Error { status: String, message: String },
}

impl OutboundMessage {
    /// The `messageType` tag.
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::PropertyStatus { .. } => "propertyStatus",
            Self::Event { .. } => "event",
            Self::ActionStatus { .. } => "actionStatus",
            Self::Error { .. } => "error",
        }
    }

    /// Name of the event, for subscription filtering.
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        match self {
            Self::Event { name, .. } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Json {
        let data = match self {
            Self::PropertyStatus { name, value } => single(name, value.to_json()),
            Self::Event {
                name,
                payload,
                timestamp,
            } => single(
                name,
                json!({
                    "data": payload.to_json(),
                    "timestamp": time::format(timestamp),
                }),
            ),
            Self::ActionStatus { descriptor } => descriptor.clone(),
            Self::Error { status, message } => json!({
                "status": status,
                "message": message,
            }),
        };
        json!({
            "messageType": self.message_type(),
            "data": data,
        })
    }
}

fn single(key: &str, value: Json) -> Json {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Json::Object(map)
}

/// A request received on a live channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "messageType", content = "data", rename_all = "camelCase")]
pub enum InboundMessage {
    /// `{ "<property>": <value>, ... }`
    SetProperty(Map<String, Json>),
    /// `{ "<action>": { "input": { ... } }, ... }`
    RequestAction(Map<String, Json>),
    /// `{ "<event>": {}, ... }`
    AddEventSubscription(Map<String, Json>),
}

impl InboundMessage {
    /// Parse a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedMessage`] when the frame is not
    /// JSON or has an unknown `messageType` or a non-object `data`.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(text).map_err(|err| ValidationError::MalformedMessage {
            reason: err.to_string(),
        })
    }
}

/// Extract the `input` object of one action request entry.
///
/// Both `{ "input": {...} }` and a missing `input` (no parameters) are accepted.
///
/// # Errors
///
/// Returns [`ValidationError::InputNotObject`] when the entry or its input is
/// not an object.
pub fn action_input(request: &Json) -> Result<Map<String, Json>, ValidationError> {
    let Json::Object(entry) = request else {
        return Err(ValidationError::InputNotObject);
    };
    match entry.get("input") {
        None | Some(Json::Null) => Ok(Map::new()),
        Some(Json::Object(input)) => Ok(input.clone()),
        Some(_) => Err(ValidationError::InputNotObject),
    }
}
