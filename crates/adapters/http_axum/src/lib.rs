//! # webthing-adapter-http-axum
//!
//! HTTP and WebSocket transport built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **Thing REST API** under the runtime's base path
//!   (`/things/{thing}`, `/things/{thing}/properties/{name}`,
//!   `/things/{thing}/actions/{name}/{id}`, …)
//! - Upgrade `GET /things/{thing}` to a **WebSocket live channel** that
//!   carries `setProperty` / `requestAction` / `addEventSubscription` in and
//!   `propertyStatus` / `actionStatus` / `event` / `error` out
//! - Map runtime errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `webthing-app` (runtime, `ThingContext`) and `webthing-domain`
//! (wire types). Only translates: every semantic decision lives in the
//! runtime. Never leaks axum types into the application layer.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
pub mod ws;
