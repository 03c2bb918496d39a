//! Thing context: the live, registered form of one Thing instance.
//!
//! A [`ThingContext`] owns the instance (behind a lock), its descriptor,
//! property/action/event tables, action scheduler and notification hub.
//! Transports only ever talk to a Thing through this type.

use std::sync::{Arc, RwLock};

use serde_json::{Map, Value as Json};

use webthing_domain::action::ActionInstance;
use webthing_domain::error::WebThingError;
use webthing_domain::id::{ActionId, SubscriberId};
use webthing_domain::message::{InboundMessage, OutboundMessage, action_input};
use webthing_domain::value::{ThingValue, Value};

use crate::action_table::{ActionBinding, ActionTable, ThingHandle};
use crate::config::RuntimeConfig;
use crate::descriptor;
use crate::event_table::EventTable;
use crate::hub::{NotificationHub, Subscription};
use crate::introspect::ThingSchema;
use crate::property_table::{PropertyBinding, PropertyTable};
use crate::scheduler::{ActionLog, Job, Scheduler};
use crate::services::Services;
use crate::thing::Thing;

/// State reachable from action bodies and the dispatcher.
pub(crate) struct Shared {
    pub(crate) name: String,
    pub(crate) properties: PropertyTable,
    pub(crate) events: EventTable,
    pub(crate) hub: NotificationHub,
    pub(crate) log: ActionLog,
}

impl Shared {
    pub(crate) fn set_property(&self, name: &str, wire: &Json) -> Result<Value, WebThingError> {
        self.properties.set_value(name, wire, &self.hub)
    }

    #[cfg(test)]
    pub(crate) fn detached(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            properties: PropertyTable::new(Vec::new(), false),
            events: EventTable::new(Vec::new(), false),
            hub: NotificationHub::new(name, 8, std::time::Duration::from_secs(1)),
            log: ActionLog::new(format!("/things/{name}")),
        })
    }
}

/// Emits the declared events of one Thing; cheap to clone and hand to
/// background tasks.
#[derive(Clone)]
pub struct EventEmitter {
    shared: Arc<Shared>,
}

impl EventEmitter {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Emit event `name` to its subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an undeclared event and
    /// [`WebThingError::Validation`] when `payload` has the wrong kind.
    pub fn emit<V: ThingValue>(&self, name: &str, payload: V) -> Result<(), WebThingError> {
        self.shared
            .events
            .emit(name, payload.into_value(), &self.shared.hub)
            .map(|_| ())
    }

    /// Emit an event that carries no payload.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an undeclared event.
    pub fn signal(&self, name: &str) -> Result<(), WebThingError> {
        self.shared
            .events
            .emit(name, Value::Null, &self.shared.hub)
            .map(|_| ())
    }
}

struct Inner {
    href: String,
    descriptor: Arc<Json>,
    shared: Arc<Shared>,
    actions: ActionTable,
    scheduler: Scheduler,
}

/// A registered Thing.
#[derive(Clone)]
pub struct ThingContext {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ThingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThingContext")
            .field("name", &self.inner.shared.name)
            .field("href", &self.inner.href)
            .finish_non_exhaustive()
    }
}

impl ThingContext {
    /// Bind `thing` to `schema` and start its scheduler.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn start<T: Thing>(
        thing: T,
        schema: &ThingSchema<T>,
        config: &RuntimeConfig,
        services: &Services,
    ) -> Self {
        let name = thing.name();
        let href = format!("{}/{name}", config.href_prefix());
        let descriptor = Arc::new(descriptor::build(&thing, schema, &href));
        let instance = Arc::new(RwLock::new(thing));

        let properties = schema
            .properties
            .iter()
            .map(|property| PropertyBinding::bind(property, &instance))
            .collect();
        let shared = Arc::new(Shared {
            name: name.clone(),
            properties: PropertyTable::new(properties, config.ignore_case),
            events: EventTable::new(schema.events.clone(), config.ignore_case),
            hub: NotificationHub::new(
                name,
                config.subscriber_buffer,
                config.subscriber_send_timeout(),
            )
            .with_backlog(config.subscriber_backlog),
            log: ActionLog::new(href.clone()),
        });

        let handle = ThingHandle::new(instance, Arc::clone(&shared));
        let actions = schema
            .actions
            .iter()
            .map(|action| ActionBinding::bind(action, &handle, services))
            .collect();
        let scheduler = Scheduler::start(Arc::clone(&shared), config);

        Self {
            inner: Arc::new(Inner {
                href,
                descriptor,
                shared,
                actions: ActionTable::new(actions, config.ignore_case),
                scheduler,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.shared.name
    }

    /// Absolute href of this Thing, e.g. `/things/lamp`.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.inner.href
    }

    /// The Thing Description. Built once at registration.
    #[must_use]
    pub fn descriptor(&self) -> Arc<Json> {
        Arc::clone(&self.inner.descriptor)
    }

    /// Current value of property `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] when there is no such property.
    pub fn get_property(&self, name: &str) -> Result<Value, WebThingError> {
        Ok(self.inner.shared.properties.get_value(name)?)
    }

    /// Every property with its current value.
    #[must_use]
    pub fn properties(&self) -> Map<String, Json> {
        self.inner
            .shared
            .properties
            .values()
            .into_iter()
            .map(|(name, value)| (name, value.to_json()))
            .collect()
    }

    /// Validate and write property `name`, returning the value read back.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown property and
    /// [`WebThingError::Validation`] for a rejected or read-only write.
    #[tracing::instrument(skip(self, wire), fields(thing = %self.name()))]
    pub fn set_property(&self, name: &str, wire: &Json) -> Result<Value, WebThingError> {
        self.inner.shared.set_property(name, wire)
    }

    /// Validate `input` and queue action `name`.
    ///
    /// Returns the descriptor of the new instance, still `created`.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown action,
    /// [`WebThingError::Validation`] for rejected input (nothing is queued)
    /// and [`WebThingError::Overloaded`] when the queue has no room.
    #[tracing::instrument(skip(self, input), fields(thing = %self.name()))]
    pub async fn request_action(
        &self,
        name: &str,
        input: &Map<String, Json>,
    ) -> Result<Json, WebThingError> {
        let shared = &self.inner.shared;
        let binding = self.inner.actions.find(name)?;
        let values = binding.validate(input).inspect_err(|err| {
            tracing::debug!(%err, "action input rejected");
        })?;

        let permit = self.inner.scheduler.reserve().await?;
        let instance = ActionInstance::new(&shared.name, binding.name(), values);
        let id = instance.id;
        let cancellation = self.inner.scheduler.child_token();
        let descriptor = shared.log.admit(instance, cancellation.clone(), &shared.hub);
        permit.send(Job {
            id,
            binding: Arc::clone(binding),
            cancellation,
        });

        tracing::info!(action = %id, "action queued");
        Ok(descriptor)
    }

    /// Descriptor of instance `id` of action `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown action or instance.
    pub fn action(&self, name: &str, id: ActionId) -> Result<Json, WebThingError> {
        let binding = self.inner.actions.find(name)?;
        Ok(self.inner.shared.log.describe(binding.name(), id)?)
    }

    /// Descriptors of every instance of action `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown action.
    pub fn actions_named(&self, name: &str) -> Result<Vec<Json>, WebThingError> {
        let binding = self.inner.actions.find(name)?;
        Ok(self.inner.shared.log.list(Some(binding.name())))
    }

    /// Descriptors of every action instance, in request order.
    #[must_use]
    pub fn actions(&self) -> Vec<Json> {
        self.inner.shared.log.list(None)
    }

    /// Snapshot of instance `id`.
    #[must_use]
    pub fn action_instance(&self, id: ActionId) -> Option<ActionInstance> {
        self.inner.shared.log.get(id)
    }

    /// Ask a created or pending instance to stop. It ends in `error`.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown action or instance
    /// and [`WebThingError::Transition`] when it already finished.
    pub fn cancel_action(&self, name: &str, id: ActionId) -> Result<(), WebThingError> {
        let binding = self.inner.actions.find(name)?;
        self.inner.shared.log.cancel(binding.name(), id)?;
        tracing::info!(thing = %self.name(), action = %id, "action cancellation requested");
        Ok(())
    }

    /// Cancel instance `id` if it is still running and forget it.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown action or instance.
    pub fn remove_action(&self, name: &str, id: ActionId) -> Result<(), WebThingError> {
        let binding = self.inner.actions.find(name)?;
        let removed = self.inner.shared.log.remove(binding.name(), id)?;
        tracing::info!(
            thing = %self.name(),
            action = %id,
            status = %removed.status,
            "action instance removed"
        );
        Ok(())
    }

    /// Attach a subscriber channel. Must be called from within a Tokio runtime.
    pub fn attach(&self) -> Subscription {
        self.inner.shared.hub.attach()
    }

    pub fn detach(&self, id: SubscriberId) -> bool {
        self.inner.shared.hub.detach(id)
    }

    /// Deliver event `name` to subscriber `id` from now on.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an undeclared event.
    pub fn subscribe_event(&self, id: SubscriberId, name: &str) -> Result<(), WebThingError> {
        let event = self.inner.shared.events.find(name)?;
        self.inner.shared.hub.subscribe_event(id, &event.name);
        Ok(())
    }

    #[must_use]
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter::new(Arc::clone(&self.inner.shared))
    }

    /// Process one text frame from subscriber `id`.
    ///
    /// Failures are answered with an `error` message to that subscriber only.
    pub async fn handle_message(&self, id: SubscriberId, text: &str) {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(err) => {
                self.reply_error(id, &WebThingError::from(err));
                return;
            }
        };

        match message {
            InboundMessage::SetProperty(data) => {
                for (name, value) in &data {
                    if let Err(err) = self.set_property(name, value) {
                        self.reply_error(id, &err);
                    }
                }
            }
            InboundMessage::RequestAction(data) => {
                for (name, request) in &data {
                    let outcome = match action_input(request) {
                        Ok(input) => self.request_action(name, &input).await.map(|_| ()),
                        Err(err) => Err(err.into()),
                    };
                    if let Err(err) = outcome {
                        self.reply_error(id, &err);
                    }
                }
            }
            InboundMessage::AddEventSubscription(data) => {
                for name in data.keys() {
                    if let Err(err) = self.subscribe_event(id, name) {
                        self.reply_error(id, &err);
                    }
                }
            }
        }
    }

    fn reply_error(&self, id: SubscriberId, err: &WebThingError) {
        tracing::debug!(%err, thing = %self.name(), subscriber = %id, "inbound message rejected");
        self.inner.shared.hub.send_to(
            id,
            OutboundMessage::Error {
                status: status_line(err).to_string(),
                message: err.to_string(),
            },
        );
    }

    /// Cancel running actions and close every subscriber channel.
    pub fn close(&self) {
        self.inner.scheduler.shutdown();
        self.inner.shared.hub.close_all();
        tracing::debug!(thing = %self.name(), "thing closed");
    }
}

fn status_line(err: &WebThingError) -> &'static str {
    match err {
        WebThingError::Validation(_) => "400 Bad Request",
        WebThingError::NotFound(_) => "404 Not Found",
        WebThingError::Overloaded => "503 Service Unavailable",
        WebThingError::Transition(_) => "409 Conflict",
        WebThingError::Registration(_) => "500 Internal Server Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use webthing_domain::action::ActionStatus;
    use webthing_domain::error::ActionFault;

    use crate::action_table::ActionInvocation;
    use crate::config::Backpressure;
    use crate::introspect::introspect;
    use crate::thing::Members;

    struct Lamp {
        on: bool,
        level: i32,
    }

    impl Thing for Lamp {
        fn name(&self) -> String {
            "lamp".to_string()
        }

        fn declare(members: &mut Members<Self>) {
            members.property_rw("on", |l: &Lamp| l.on, |l, v| l.on = v);
            members
                .property_rw("level", |l: &Lamp| l.level, |l, v| l.level = v)
                .minimum(0)
                .maximum(100);
            members
                .action("fade", |invocation: ActionInvocation<Lamp>| async move {
                    let level: i32 = invocation.input.get("level")?;
                    let duration: u64 = invocation.input.get("duration")?;
                    invocation.sleep(Duration::from_millis(duration)).await?;
                    invocation
                        .thing
                        .set_property("level", level)
                        .map_err(ActionFault::failed)?;
                    invocation
                        .thing
                        .emit("faded", level)
                        .map_err(ActionFault::failed)?;
                    Ok(())
                })
                .param_with::<i32>("level", |p| {
                    p.minimum(0).maximum(100);
                })
                .param::<u64>("duration")
                .inject_cancellation();
            members.action("explode", |invocation: ActionInvocation<Lamp>| async move {
                assert!(invocation.input.value("fuse").is_some(), "lamp exploded");
                Ok(())
            });
            members.event::<i32>("faded");
        }
    }

    fn start(config: &RuntimeConfig) -> ThingContext {
        let schema = introspect::<Lamp>(&Services::new(), config.ignore_case).unwrap();
        ThingContext::start(
            Lamp {
                on: false,
                level: 0,
            },
            &schema,
            config,
            &Services::new(),
        )
    }

    fn input(value: Json) -> Map<String, Json> {
        value.as_object().cloned().unwrap()
    }

    async fn settle(context: &ThingContext, id: ActionId) -> ActionInstance {
        for _ in 0..200 {
            let instance = context.action_instance(id).unwrap();
            if instance.status.is_terminal() {
                return instance;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("action {id} did not finish");
    }

    fn id_of(descriptor: &Json, name: &str) -> ActionId {
        let href = descriptor[name]["href"].as_str().unwrap();
        href.rsplit('/').next().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn should_expose_descriptor_and_property_values() {
        let context = start(&RuntimeConfig::default());
        assert_eq!(context.href(), "/things/lamp");
        assert_eq!(context.descriptor()["id"], "/things/lamp");
        assert_eq!(
            context.properties(),
            input(json!({ "on": false, "level": 0 }))
        );
    }

    #[tokio::test]
    async fn should_run_action_to_completion_and_apply_its_effects() {
        let context = start(&RuntimeConfig::default());
        let mut sub = context.attach();
        context.subscribe_event(sub.id, "faded").unwrap();

        let created = context
            .request_action("fade", &input(json!({ "level": 40, "duration": 0 })))
            .await
            .unwrap();
        assert_eq!(created["fade"]["status"], "created");
        assert_eq!(created["fade"]["input"], json!({ "level": 40, "duration": 0 }));

        let instance = settle(&context, id_of(&created, "fade")).await;
        assert_eq!(instance.status, ActionStatus::Completed);
        assert!(instance.time_completed.unwrap() >= instance.time_requested);
        assert_eq!(context.get_property("level").unwrap(), Value::I32(40));

        let mut types = Vec::new();
        while let Ok(Some(message)) =
            tokio::time::timeout(Duration::from_millis(100), sub.receiver.recv()).await
        {
            types.push(message.message_type());
        }
        assert_eq!(
            types,
            vec![
                "actionStatus",
                "actionStatus",
                "propertyStatus",
                "event",
                "actionStatus"
            ]
        );
    }

    #[tokio::test]
    async fn should_reject_invalid_input_without_creating_an_instance() {
        let context = start(&RuntimeConfig::default());
        let result = context
            .request_action("fade", &input(json!({ "level": 140, "duration": 0 })))
            .await;
        assert!(matches!(result, Err(WebThingError::Validation(_))));
        assert!(context.actions().is_empty());

        let unknown = context.request_action("blink", &Map::new()).await;
        assert!(matches!(unknown, Err(WebThingError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_when_queue_is_full() {
        let config = RuntimeConfig {
            action_queue_capacity: 1,
            action_workers: 1,
            ..RuntimeConfig::default()
        };
        let context = start(&config);
        let slow = input(json!({ "level": 10, "duration": 60_000 }));

        context.request_action("fade", &slow).await.unwrap();
        let overloaded = context.request_action("fade", &slow).await;
        assert!(matches!(overloaded, Err(WebThingError::Overloaded)));
        assert_eq!(context.actions().len(), 1);
        context.close();
    }

    #[tokio::test]
    async fn should_wait_for_room_before_rejecting() {
        let config = RuntimeConfig {
            action_queue_capacity: 1,
            action_workers: 1,
            backpressure: Backpressure::Wait {
                wait_timeout_ms: 500,
            },
            ..RuntimeConfig::default()
        };
        let context = start(&config);
        let quick = input(json!({ "level": 10, "duration": 0 }));

        context.request_action("fade", &quick).await.unwrap();
        context.request_action("fade", &quick).await.unwrap();
        assert_eq!(context.actions().len(), 2);
    }

    #[tokio::test]
    async fn should_cancel_pending_action_into_error() {
        let context = start(&RuntimeConfig::default());
        let created = context
            .request_action("fade", &input(json!({ "level": 10, "duration": 60_000 })))
            .await
            .unwrap();
        let id = id_of(&created, "fade");

        context.cancel_action("fade", id).unwrap();
        let instance = settle(&context, id).await;
        assert_eq!(instance.status, ActionStatus::Error);
        assert_eq!(instance.fault, Some(ActionFault::Cancelled));
        assert_eq!(context.get_property("level").unwrap(), Value::I32(0));

        assert!(matches!(
            context.cancel_action("fade", id),
            Err(WebThingError::Transition(_))
        ));
    }

    #[tokio::test]
    async fn should_fail_only_the_panicking_action() {
        let context = start(&RuntimeConfig::default());
        let created = context.request_action("explode", &Map::new()).await.unwrap();
        let instance = settle(&context, id_of(&created, "explode")).await;
        assert_eq!(instance.status, ActionStatus::Error);

        let created = context
            .request_action("fade", &input(json!({ "level": 5, "duration": 0 })))
            .await
            .unwrap();
        let instance = settle(&context, id_of(&created, "fade")).await;
        assert_eq!(instance.status, ActionStatus::Completed);
    }

    #[tokio::test]
    async fn should_list_and_remove_instances() {
        let context = start(&RuntimeConfig::default());
        let created = context
            .request_action("fade", &input(json!({ "level": 10, "duration": 0 })))
            .await
            .unwrap();
        let id = id_of(&created, "fade");

        assert_eq!(context.actions_named("fade").unwrap().len(), 1);
        assert!(context.actions_named("explode").unwrap().is_empty());
        assert!(context.action("fade", id).is_ok());
        assert!(context.action("explode", id).is_err());

        context.remove_action("fade", id).unwrap();
        assert!(context.action("fade", id).is_err());
        assert!(matches!(
            context.remove_action("fade", id),
            Err(WebThingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_answer_rejected_messages_to_sender_only() {
        let context = start(&RuntimeConfig::default());
        let mut sender = context.attach();
        let mut other = context.attach();

        context
            .handle_message(
                sender.id,
                r#"{"messageType":"setProperty","data":{"level":500}}"#,
            )
            .await;
        context
            .handle_message(
                sender.id,
                r#"{"messageType":"addEventSubscription","data":{"melted":{}}}"#,
            )
            .await;
        context.handle_message(sender.id, "not json").await;

        for expected in ["400 Bad Request", "404 Not Found", "400 Bad Request"] {
            let message = sender.receiver.recv().await.unwrap();
            let OutboundMessage::Error { status, .. } = &*message else {
                panic!("expected an error reply");
            };
            assert_eq!(status, expected);
        }
        assert!(
            tokio::time::timeout(Duration::from_millis(50), other.receiver.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn should_apply_inbound_writes_and_requests() {
        let context = start(&RuntimeConfig::default());
        let sub = context.attach();

        context
            .handle_message(
                sub.id,
                r#"{"messageType":"setProperty","data":{"on":true}}"#,
            )
            .await;
        context
            .handle_message(
                sub.id,
                r#"{"messageType":"requestAction","data":{"fade":{"input":{"level":20,"duration":0}}}}"#,
            )
            .await;

        assert_eq!(context.get_property("on").unwrap(), Value::Bool(true));
        assert_eq!(context.actions_named("fade").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_keep_writing_while_a_subscriber_stalls() {
        let config = RuntimeConfig {
            subscriber_buffer: 1,
            subscriber_send_timeout_ms: 20,
            ..RuntimeConfig::default()
        };
        let context = start(&config);
        let stalled = context.attach();
        let mut healthy = context.attach();

        for level in 0..10 {
            context.set_property("level", &json!(level)).unwrap();
            let message = healthy.receiver.recv().await.unwrap();
            assert_eq!(
                *message,
                OutboundMessage::PropertyStatus {
                    name: "level".into(),
                    value: Value::I32(level)
                }
            );
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!context.detach(stalled.id));
        assert!(context.detach(healthy.id));
    }

    #[tokio::test]
    async fn should_emit_declared_events_through_emitter() {
        let context = start(&RuntimeConfig::default());
        let mut sub = context.attach();
        context.subscribe_event(sub.id, "faded").unwrap();

        context.emitter().emit("faded", 3).unwrap();
        assert!(context.emitter().emit("faded", "three".to_string()).is_err());
        assert!(context.emitter().signal("melted").is_err());

        assert_eq!(sub.receiver.recv().await.unwrap().message_type(), "event");
    }

    #[tokio::test]
    async fn should_close_subscribers_and_cancel_actions_on_close() {
        let context = start(&RuntimeConfig::default());
        let mut sub = context.attach();
        let created = context
            .request_action("fade", &input(json!({ "level": 10, "duration": 60_000 })))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        context.close();
        let instance = settle(&context, id_of(&created, "fade")).await;
        assert_eq!(instance.fault, Some(ActionFault::Cancelled));
        while sub.receiver.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn should_fail_every_queued_action_when_closed() {
        let config = RuntimeConfig {
            action_queue_capacity: 4,
            action_workers: 1,
            ..RuntimeConfig::default()
        };
        let context = start(&config);
        let slow = input(json!({ "level": 10, "duration": 60_000 }));

        let running = context.request_action("fade", &slow).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut ids = vec![id_of(&running, "fade")];
        for _ in 0..3 {
            let queued = context.request_action("fade", &slow).await.unwrap();
            ids.push(id_of(&queued, "fade"));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        context.close();
        for id in ids {
            let instance = settle(&context, id).await;
            assert_eq!(instance.status, ActionStatus::Error);
            assert_eq!(instance.fault, Some(ActionFault::Cancelled));
            assert!(instance.time_completed.is_some());
        }
        assert_eq!(context.get_property("level").unwrap(), Value::I32(0));
    }
}
