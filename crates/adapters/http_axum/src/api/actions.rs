//! Action requests and the action log.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use webthing_domain::id::ActionId;
use webthing_domain::message::action_input;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoints.
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
    Ok(Json<Value>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the request endpoints.
pub enum RequestResponse {
    Created(Json<Value>),
}

impl IntoResponse for RequestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete and cancel endpoints.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Unknown ids cannot name an existing instance.
fn action_id(id: &str) -> Result<ActionId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::not_found("Action request", id))
}

/// Input of a request for `action`: `{ "<action>": { "input": … } }` or `{ "input": … }`.
fn request_input(action: &str, body: &Value) -> Result<Map<String, Value>, ApiError> {
    let entry = body.get(action).unwrap_or(body);
    Ok(action_input(entry)?)
}

/// `GET /things/{thing}/actions`
pub async fn list(
    State(state): State<AppState>,
    Path(thing): Path<String>,
) -> Result<ListResponse, ApiError> {
    let context = state.thing(&thing)?;
    Ok(ListResponse::Ok(Json(context.actions())))
}

/// `POST /things/{thing}/actions` with `{ "<action>": { "input": … } }`
pub async fn request_any(
    State(state): State<AppState>,
    Path(thing): Path<String>,
    Json(body): Json<Value>,
) -> Result<RequestResponse, ApiError> {
    let context = state.thing(&thing)?;
    let Some((action, entry)) = body.as_object().and_then(|map| {
        let mut entries = map.iter();
        match (entries.next(), entries.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }) else {
        return Err(ApiError::malformed(
            "expected exactly one {\"<action>\": {\"input\": …}} entry",
        ));
    };
    let input = action_input(entry)?;
    let descriptor = context.request_action(action, &input).await?;
    Ok(RequestResponse::Created(Json(descriptor)))
}

/// `GET /things/{thing}/actions/{action}`
pub async fn list_named(
    State(state): State<AppState>,
    Path((thing, action)): Path<(String, String)>,
) -> Result<ListResponse, ApiError> {
    let context = state.thing(&thing)?;
    Ok(ListResponse::Ok(Json(context.actions_named(&action)?)))
}

/// `POST /things/{thing}/actions/{action}`
pub async fn request(
    State(state): State<AppState>,
    Path((thing, action)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<RequestResponse, ApiError> {
    let context = state.thing(&thing)?;
    let input = request_input(&action, &body)?;
    let descriptor = context.request_action(&action, &input).await?;
    Ok(RequestResponse::Created(Json(descriptor)))
}

/// `GET /things/{thing}/actions/{action}/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path((thing, action, id)): Path<(String, String, String)>,
) -> Result<GetResponse, ApiError> {
    let context = state.thing(&thing)?;
    Ok(GetResponse::Ok(Json(context.action(&action, action_id(&id)?)?)))
}

/// `DELETE /things/{thing}/actions/{action}/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path((thing, action, id)): Path<(String, String, String)>,
) -> Result<DeleteResponse, ApiError> {
    let context = state.thing(&thing)?;
    context.remove_action(&action, action_id(&id)?)?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /things/{thing}/actions/{action}/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Path((thing, action, id)): Path<(String, String, String)>,
) -> Result<DeleteResponse, ApiError> {
    let context = state.thing(&thing)?;
    context.cancel_action(&action, action_id(&id)?)?;
    Ok(DeleteResponse::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_accept_wrapped_and_bare_input() {
        let wrapped = request_input("fade", &json!({ "fade": { "input": { "level": 5 } } }));
        let bare = request_input("fade", &json!({ "input": { "level": 5 } }));
        assert_eq!(wrapped.unwrap(), bare.unwrap());
    }

    #[test]
    fn should_treat_missing_input_as_empty() {
        assert!(request_input("toggle", &json!({})).unwrap().is_empty());
    }

    #[test]
    fn should_reject_non_object_input() {
        let err = request_input("fade", &json!({ "input": [1, 2] })).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_report_unparsable_id_as_not_found() {
        assert_eq!(
            action_id("not-a-uuid").unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }
}
