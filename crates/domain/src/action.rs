//! Action instance: one invocation of a declared action and its lifecycle.
//!
//! Status only moves forward: `created → pending → completed | error`.
//! Cancellation is not a separate terminal state; it ends in `error` with
//! [`ActionFault::Cancelled`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json, json};

use crate::error::{ActionFault, TransitionError};
use crate::id::ActionId;
use crate::time::{self, Timestamp};
use crate::value::Value;

/// Lifecycle status of an [`ActionInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Created,
    Pending,
    Completed,
    Error,
}

impl ActionStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether `self → next` is one of the allowed transitions.
    #[must_use]
    pub fn can_move_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Pending) | (Self::Pending, Self::Completed | Self::Error)
        )
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// One invocation of an action, retained in the Thing's action log until removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInstance {
    pub id: ActionId,
    /// Name of the owning Thing.
    pub thing: String,
    /// External name of the action.
    pub name: String,
    /// Validated input, keyed by external parameter name.
    pub input: BTreeMap<String, Value>,
    pub status: ActionStatus,
    pub time_requested: Timestamp,
    pub time_completed: Option<Timestamp>,
    pub fault: Option<ActionFault>,
}

impl ActionInstance {
    /// A fresh instance in [`ActionStatus::Created`], requested now.
    #[must_use]
    pub fn new(
        thing: impl Into<String>,
        name: impl Into<String>,
        input: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            id: ActionId::new(),
            thing: thing.into(),
            name: name.into(),
            input,
            status: ActionStatus::Created,
            time_requested: time::now(),
            time_completed: None,
            fault: None,
        }
    }

    /// `created → pending`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] from any other status.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.advance(ActionStatus::Pending)
    }

    /// `pending → completed`, stamping `time_completed`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the instance is pending.
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        self.advance(ActionStatus::Completed)?;
        self.time_completed = Some(self.completion_time());
        Ok(())
    }

    /// `pending → error`, capturing `fault` and stamping `time_completed`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the instance is pending.
    pub fn fail(&mut self, fault: ActionFault) -> Result<(), TransitionError> {
        self.advance(ActionStatus::Error)?;
        self.time_completed = Some(self.completion_time());
        self.fault = Some(fault);
        Ok(())
    }

    fn advance(&mut self, to: ActionStatus) -> Result<(), TransitionError> {
        if !self.status.can_move_to(to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    // Clocks are not monotonic; never report completion before the request.
    fn completion_time(&self) -> Timestamp {
        time::now().max(self.time_requested)
    }

    /// Validated input rendered as a JSON object.
    #[must_use]
    pub fn input_json(&self) -> Json {
        Json::Object(
            self.input
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<Map<_, _>>(),
        )
    }

    /// Wire descriptor: `{ "<name>": { input, href, status, timeRequested, ... } }`.
    ///
    /// `href` is the absolute link of this instance.
    #[must_use]
    pub fn descriptor(&self, href: &str) -> Json {
        let mut body = json!({
            "input": self.input_json(),
            "href": href,
            "status": self.status,
            "timeRequested": time::format(&self.time_requested),
        });
        if let Some(completed) = &self.time_completed {
            body["timeCompleted"] = Json::String(time::format(completed));
        }
        if let Some(fault) = &self.fault {
            body["error"] = Json::String(fault.to_string());
        }

        let mut wrapper = Map::new();
        wrapper.insert(self.name.clone(), body);
        Json::Object(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> ActionInstance {
        let mut input = BTreeMap::new();
        input.insert("level".to_string(), Value::U8(40));
        ActionInstance::new("lamp", "fade", input)
    }

    #[test]
    fn should_start_in_created_without_completion_time() {
        let action = instance();
        assert_eq!(action.status, ActionStatus::Created);
        assert!(action.time_completed.is_none());
        assert!(action.fault.is_none());
    }

    #[test]
    fn should_complete_after_start() {
        let mut action = instance();
        action.start().unwrap();
        action.complete().unwrap();
        assert_eq!(action.status, ActionStatus::Completed);
        assert!(action.time_completed.unwrap() >= action.time_requested);
    }

    #[test]
    fn should_capture_fault_when_failing() {
        let mut action = instance();
        action.start().unwrap();
        action.fail(ActionFault::Cancelled).unwrap();
        assert_eq!(action.status, ActionStatus::Error);
        assert_eq!(action.fault, Some(ActionFault::Cancelled));
    }

    #[test]
    fn should_refuse_to_skip_pending() {
        let mut action = instance();
        let err = action.complete().unwrap_err();
        assert_eq!(
            err,
            TransitionError {
                from: ActionStatus::Created,
                to: ActionStatus::Completed
            }
        );
        assert_eq!(action.status, ActionStatus::Created);
    }

    #[test]
    fn should_refuse_to_leave_terminal_state() {
        let mut action = instance();
        action.start().unwrap();
        action.complete().unwrap();
        assert!(action.start().is_err());
        assert!(action.fail(ActionFault::Cancelled).is_err());
        assert_eq!(action.status, ActionStatus::Completed);
        assert!(action.fault.is_none());
    }

    #[test]
    fn should_report_terminal_statuses() {
        assert!(!ActionStatus::Created.is_terminal());
        assert!(!ActionStatus::Pending.is_terminal());
        assert!(ActionStatus::Completed.is_terminal());
        assert!(ActionStatus::Error.is_terminal());
    }

    #[test]
    fn should_serialize_status_in_lowercase() {
        let json = serde_json::to_string(&ActionStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!(ActionStatus::Error.to_string(), "error");
    }

    #[test]
    fn should_render_created_descriptor_without_completion() {
        let action = instance();
        let descriptor = action.descriptor("/things/lamp/actions/fade/1");
        let body = &descriptor["fade"];
        assert_eq!(body["status"], "created");
        assert_eq!(body["input"], json!({ "level": 40 }));
        assert_eq!(body["href"], "/things/lamp/actions/fade/1");
        assert!(body["timeRequested"].is_string());
        assert!(body.get("timeCompleted").is_none());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn should_render_error_in_failed_descriptor() {
        let mut action = instance();
        action.start().unwrap();
        action.fail(ActionFault::failed("stuck")).unwrap();
        let descriptor = action.descriptor("/x");
        assert_eq!(descriptor["fade"]["status"], "error");
        assert_eq!(descriptor["fade"]["error"], "stuck");
        assert!(descriptor["fade"]["timeCompleted"].is_string());
    }
}
