//! Common error types used across the workspace.
//!
//! Each failure family has its own typed error; [`WebThingError`] wraps them
//! via `#[from]` so `?` works across layers. None of these errors is fatal to
//! the process: only [`RegistrationError`] prevents a Thing from becoming
//! reachable.

use crate::action::ActionStatus;
use crate::kind::Kind;

/// Top-level error returned by runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum WebThingError {
    /// An externally supplied value failed a kind or constraint check.
    #[error("invalid value: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown thing, property, action, event or action instance.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The action queue is saturated; the submission was not accepted.
    #[error("action queue is full")]
    Overloaded,

    /// An action instance was asked to move backwards or out of a terminal state.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// A Thing could not be registered.
    #[error("registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

/// Reasons a wire value is rejected. No state is changed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("null is not allowed")]
    NullNotAllowed,

    #[error("expected a {expected} value")]
    KindMismatch { expected: Kind },

    #[error("value cannot be read as {expected}")]
    Unparsable { expected: Kind },

    #[error("value is below minimum {minimum}")]
    BelowMinimum { minimum: String },

    #[error("value is above maximum {maximum}")]
    AboveMaximum { maximum: String },

    #[error("value must be greater than {exclusive_minimum}")]
    NotAboveExclusiveMinimum { exclusive_minimum: String },

    #[error("value must be less than {exclusive_maximum}")]
    NotBelowExclusiveMaximum { exclusive_maximum: String },

    #[error("value is not a multiple of {multiple_of}")]
    NotMultipleOf { multiple_of: String },

    #[error("string is shorter than {minimum_length} characters")]
    TooShort { minimum_length: usize },

    #[error("string is longer than {maximum_length} characters")]
    TooLong { maximum_length: usize },

    #[error("string does not match pattern {pattern}")]
    PatternMismatch { pattern: String },

    #[error("value is not one of the enumerated values")]
    NotInEnum,

    #[error("expected a single character, got {length}")]
    CharLength { length: usize },

    #[error("missing required parameter {name}")]
    MissingParameter { name: String },

    #[error("parameter {name}: {source}")]
    Parameter {
        name: String,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("property {name} is read-only")]
    ReadOnly { name: String },

    #[error("action input must be a JSON object")]
    InputNotObject,

    #[error("malformed message: {reason}")]
    MalformedMessage { reason: String },
}

/// A lookup by name or id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

impl NotFoundError {
    #[must_use]
    pub fn new(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            id: id.into(),
        }
    }
}

/// Attempted an action status change that is not `created → pending → terminal`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: ActionStatus,
    pub to: ActionStatus,
}

/// Misconfiguration discovered while registering a Thing.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("thing {thing} exposes no properties, actions or events")]
    NoMembers { thing: String },

    #[error("member {member} is declared more than once")]
    DuplicateMember { member: String },

    #[error("member {member}: {constraint} does not apply to {kind} values")]
    InvalidConstraint {
        member: String,
        constraint: &'static str,
        kind: Kind,
    },

    #[error("member {member}: {constraint} value {value} is not a valid {kind}")]
    UnrepresentableBound {
        member: String,
        constraint: &'static str,
        value: String,
        kind: Kind,
    },

    #[error("member {member}: invalid pattern")]
    InvalidPattern {
        member: String,
        #[source]
        source: regex::Error,
    },

    #[error("action {action} requires service {service} which is not provided")]
    MissingService {
        action: String,
        service: &'static str,
    },

    #[error("a thing named {name} is already registered")]
    DuplicateThing { name: String },
}

/// Failure of an action body, captured on the action instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionFault {
    #[error("action was cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

impl ActionFault {
    /// Build a [`ActionFault::Failed`] from any displayable error.
    #[must_use]
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}
