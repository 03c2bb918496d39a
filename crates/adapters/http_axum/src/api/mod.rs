//! JSON REST handler modules, mounted under the runtime's base path.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod properties;
#[allow(clippy::missing_errors_doc)]
pub mod things;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the Thing sub-router. Paths are relative to the base path.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Things
        .route("/", get(things::list))
        .route("/{thing}", get(things::get))
        // Properties
        .route("/{thing}/properties", get(properties::list))
        .route(
            "/{thing}/properties/{property}",
            get(properties::get).put(properties::put),
        )
        // Actions
        .route(
            "/{thing}/actions",
            get(actions::list).post(actions::request_any),
        )
        .route(
            "/{thing}/actions/{action}",
            get(actions::list_named).post(actions::request),
        )
        .route(
            "/{thing}/actions/{action}/{id}",
            get(actions::get).delete(actions::delete),
        )
        .route("/{thing}/actions/{action}/{id}/cancel", post(actions::cancel))
        // Events
        .route("/{thing}/events", get(events::list))
        .route("/{thing}/events/{event}", get(events::get))
}
