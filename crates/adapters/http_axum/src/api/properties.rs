//! Property reads and writes.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the property endpoints: `{ "<name>": <value>, … }`.
pub enum PropertyResponse {
    Ok(Json<Map<String, Value>>),
}

impl IntoResponse for PropertyResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn single(name: String, value: Value) -> PropertyResponse {
    let mut body = Map::new();
    body.insert(name, value);
    PropertyResponse::Ok(Json(body))
}

/// `GET /things/{thing}/properties`
pub async fn list(
    State(state): State<AppState>,
    Path(thing): Path<String>,
) -> Result<PropertyResponse, ApiError> {
    let context = state.thing(&thing)?;
    Ok(PropertyResponse::Ok(Json(context.properties())))
}

/// `GET /things/{thing}/properties/{property}`
pub async fn get(
    State(state): State<AppState>,
    Path((thing, property)): Path<(String, String)>,
) -> Result<PropertyResponse, ApiError> {
    let context = state.thing(&thing)?;
    let value = context.get_property(&property)?;
    Ok(single(property, value.to_json()))
}

/// `PUT /things/{thing}/properties/{property}` with `{ "<property>": <value> }`
///
/// Echoes the value read back after the write.
pub async fn put(
    State(state): State<AppState>,
    Path((thing, property)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<PropertyResponse, ApiError> {
    let context = state.thing(&thing)?;
    let wire = body
        .get(&property)
        .ok_or_else(|| ApiError::malformed(format!("expected {{\"{property}\": <value>}}")))?;
    let value = context.set_property(&property, wire)?;
    Ok(single(property, value.to_json()))
}
