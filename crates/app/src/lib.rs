//! # webthing-app
//!
//! Application layer: the Thing runtime.
//!
//! ## Responsibilities
//! - Let a Rust type **declare** itself as a Thing ([`thing::Thing`])
//! - **Introspect** declarations once per type into validated schemas
//! - **Build** the Thing Description served to clients
//! - Bind each instance into **property, action and event tables**
//! - **Schedule** actions on a bounded per-Thing queue and track their
//!   lifecycle
//! - **Fan out** property, event and action-status notifications to
//!   subscriber channels without letting a slow subscriber stall the rest
//!
//! ## Dependency rule
//! Depends on `webthing-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Transports depend on *this* crate and talk
//! to Things through [`context::ThingContext`] and [`runtime::Runtime`].

pub mod action_table;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod event_table;
pub mod hub;
pub mod introspect;
pub mod property_table;
pub mod runtime;
pub mod scheduler;
pub mod services;
pub mod thing;
