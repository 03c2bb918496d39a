//! Thing descriptions, and the WebSocket upgrade on a Thing's href.

use axum::Json;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Value>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Description(Json<Value>),
    Upgrade(Response),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Description(json) => json.into_response(),
            Self::Upgrade(response) => response,
        }
    }
}

/// `GET /things`
pub async fn list(State(state): State<AppState>) -> ListResponse {
    let descriptions = state
        .runtime
        .things()
        .iter()
        .map(|thing| thing.descriptor().as_ref().clone())
        .collect();
    ListResponse::Ok(Json(descriptions))
}

/// `GET /things/{thing}`
///
/// Answers with the Thing Description, or opens a live channel when the
/// request is a WebSocket upgrade.
pub async fn get(
    State(state): State<AppState>,
    Path(thing): Path<String>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<GetResponse, ApiError> {
    let context = state.thing(&thing)?;
    Ok(match upgrade {
        Ok(upgrade) => GetResponse::Upgrade(crate::ws::upgrade(upgrade, context)),
        Err(_) => GetResponse::Description(Json(context.descriptor().as_ref().clone())),
    })
}
