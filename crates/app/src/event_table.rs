//! Event table: declared events of one Thing and payload checks on emit.

use webthing_domain::error::{NotFoundError, ValidationError, WebThingError};
use webthing_domain::message::OutboundMessage;
use webthing_domain::time;
use webthing_domain::value::Value;

use crate::hub::NotificationHub;
use crate::introspect::{EventSchema, same_name};

pub struct EventTable {
    events: Vec<EventSchema>,
    ignore_case: bool,
}

impl EventTable {
    #[must_use]
    pub fn new(events: Vec<EventSchema>, ignore_case: bool) -> Self {
        Self {
            events,
            ignore_case,
        }
    }

    /// Look up an event by external name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no event has that name.
    pub fn find(&self, name: &str) -> Result<&EventSchema, NotFoundError> {
        self.events
            .iter()
            .find(|event| same_name(&event.name, name, self.ignore_case))
            .ok_or_else(|| NotFoundError::new("Event", name))
    }

    /// Publish event `name` to the subscribers of that event.
    ///
    /// Signals drop whatever payload they are given.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an undeclared event and
    /// [`WebThingError::Validation`] when the payload does not match the
    /// declared kind.
    pub fn emit(
        &self,
        name: &str,
        payload: Value,
        hub: &NotificationHub,
    ) -> Result<usize, WebThingError> {
        let event = self.find(name)?;
        let payload = match (&event.payload, payload) {
            (None, _) => Value::Null,
            (Some(descriptor), Value::Null) if !descriptor.nullable => {
                return Err(ValidationError::NullNotAllowed.into());
            }
            (Some(descriptor), payload) => {
                if payload.kind().is_some_and(|kind| kind != descriptor.kind) {
                    return Err(ValidationError::KindMismatch {
                        expected: descriptor.kind,
                    }
                    .into());
                }
                payload
            }
        };

        let delivered = hub.publish(OutboundMessage::Event {
            name: event.name.clone(),
            payload,
            timestamp: time::now(),
        });
        tracing::debug!(event = %event.name, delivered, "event emitted");
        Ok(delivered)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::introspect::introspect;
    use crate::services::Services;
    use crate::thing::{Members, Thing};

    struct Boiler;

    impl Thing for Boiler {
        fn name(&self) -> String {
            "boiler".to_string()
        }

        fn declare(members: &mut Members<Self>) {
            members.event::<f64>("overheated");
            members.event::<Option<String>>("note");
            members.signal("reset");
        }
    }

    fn table() -> EventTable {
        let schema = introspect::<Boiler>(&Services::new(), true).unwrap();
        EventTable::new(schema.events, true)
    }

    #[tokio::test]
    async fn should_publish_matching_payload_to_event_subscribers() {
        let table = table();
        let hub = NotificationHub::new("boiler", 8, Duration::from_secs(1));
        let mut sub = hub.attach();
        hub.subscribe_event(sub.id, "overheated");

        assert_eq!(table.emit("Overheated", Value::F64(92.5), &hub).unwrap(), 1);

        let message = sub.receiver.recv().await.unwrap();
        let OutboundMessage::Event { name, payload, .. } = &*message else {
            panic!("expected an event");
        };
        assert_eq!(name, "overheated");
        assert_eq!(payload, &Value::F64(92.5));
    }

    #[tokio::test]
    async fn should_reject_payload_of_another_kind() {
        let hub = NotificationHub::new("boiler", 8, Duration::from_secs(1));
        assert!(matches!(
            table().emit("overheated", Value::String("hot".into()), &hub),
            Err(WebThingError::Validation(ValidationError::KindMismatch { .. }))
        ));
        assert!(matches!(
            table().emit("overheated", Value::Null, &hub),
            Err(WebThingError::Validation(ValidationError::NullNotAllowed))
        ));
    }

    #[tokio::test]
    async fn should_accept_null_for_nullable_payload_and_drop_signal_payload() {
        let table = table();
        let hub = NotificationHub::new("boiler", 8, Duration::from_secs(1));
        assert!(table.emit("note", Value::Null, &hub).is_ok());
        assert!(table.emit("reset", Value::I32(1), &hub).is_ok());
    }

    #[test]
    fn should_report_unknown_event() {
        let hub = NotificationHub::new("boiler", 8, Duration::from_secs(1));
        assert!(matches!(
            table().emit("exploded", Value::Null, &hub),
            Err(WebThingError::NotFound(_))
        ));
        assert_eq!(
            table().names().collect::<Vec<_>>(),
            vec!["overheated", "note", "reset"]
        );
    }
}
