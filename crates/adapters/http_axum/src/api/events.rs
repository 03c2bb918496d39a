//! Declared events. Occurrences are only pushed to live channels; no
//! history is kept.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the event endpoints.
pub enum EventResponse {
    Ok(Json<Value>),
}

impl IntoResponse for EventResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /things/{thing}/events`
pub async fn list(
    State(state): State<AppState>,
    Path(thing): Path<String>,
) -> Result<EventResponse, ApiError> {
    let context = state.thing(&thing)?;
    Ok(EventResponse::Ok(Json(context.descriptor()["events"].clone())))
}

/// `GET /things/{thing}/events/{event}`
pub async fn get(
    State(state): State<AppState>,
    Path((thing, event)): Path<(String, String)>,
) -> Result<EventResponse, ApiError> {
    let context = state.thing(&thing)?;
    let descriptor = context.descriptor();
    let description = descriptor["events"]
        .get(&event)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Event", &event))?;
    Ok(EventResponse::Ok(Json(description)))
}
