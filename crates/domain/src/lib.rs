//! # webthing-domain
//!
//! Pure domain model for exposing in-process objects as Web Things.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **primitive kinds** a Thing member may have and the
//!   [`Value`](value::Value) tagged union carrying them
//! - Map Rust types onto kinds ([`ThingValue`](value::ThingValue))
//! - Define **member descriptors** (properties, action parameters, events)
//! - Validate externally supplied JSON against a descriptor
//!   ([`Validator`](validation::Validator))
//! - Define the **action lifecycle** (`created → pending → completed | error`)
//! - Define the wire shapes of live-channel messages
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! The runtime that owns Things, schedules actions and fans out
//! notifications lives in `webthing-app`.

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod kind;
pub mod member;
pub mod message;
pub mod validation;
pub mod value;
