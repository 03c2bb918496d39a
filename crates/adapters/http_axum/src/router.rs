//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the Thing routes under the runtime's base path and `/health` at
/// the root. Includes a [`TraceLayer`] that logs each HTTP request/response
/// at the `DEBUG` level using the `tracing` ecosystem.
pub fn build(state: AppState) -> Router {
    let prefix = state.runtime.config().href_prefix().to_string();
    let router = Router::new().route("/health", get(health_check));
    let router = if prefix.is_empty() {
        router.merge(crate::api::routes())
    } else {
        router.nest(&prefix, crate::api::routes())
    };
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use webthing_adapter_virtual::VirtualThings;
    use webthing_app::config::RuntimeConfig;
    use webthing_app::runtime::Runtime;

    fn app_with(config: RuntimeConfig) -> Router {
        let runtime = Arc::new(Runtime::new(config));
        webthing_adapter_virtual::register(
            &runtime,
            VirtualThings {
                sensor_period: None,
                ..VirtualThings::default()
            },
        )
        .unwrap();
        build(AppState::new(runtime))
    }

    fn app() -> Router {
        app_with(RuntimeConfig::default())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = app().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_serve_descriptor_on_plain_get() {
        let response = app().oneshot(get_request("/things/lamp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], json!("/things/lamp"));
        assert!(body["properties"]["level"].is_object());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_thing() {
        let response = app().oneshot(get_request("/things/toaster")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("toaster"));
    }

    #[tokio::test]
    async fn should_mount_routes_at_root_when_base_path_is_empty() {
        let app = app_with(RuntimeConfig {
            base_path: String::new(),
            ..RuntimeConfig::default()
        });
        let response = app.oneshot(get_request("/thermostat/properties")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["mode"], json!("Comfort"));
    }

    #[tokio::test]
    async fn should_reject_write_without_named_value() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/things/lamp/properties/level")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"brightness": 10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
