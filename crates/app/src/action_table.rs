//! Action table: per-Thing bindings of parameter validators and the
//! invocation adapter that runs an action body.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde_json::{Map, Value as Json};
use tokio_util::sync::CancellationToken;

use webthing_domain::error::{ActionFault, NotFoundError, ValidationError, WebThingError};
use webthing_domain::id::ActionId;
use webthing_domain::value::{ThingValue, Value};

use crate::context::{EventEmitter, Shared};
use crate::introspect::{ActionSchema, InputSchema, same_name};
use crate::services::Services;
use crate::thing::{BoxFuture, Thing};

/// Validated input of one invocation, keyed by declared parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionInput {
    values: BTreeMap<String, Value>,
}

impl ActionInput {
    /// Typed value of parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionFault::Failed`] when there is no such parameter or it
    /// holds a value of another type.
    pub fn get<V: ThingValue>(&self, name: &str) -> Result<V, ActionFault> {
        self.values
            .get(name)
            .cloned()
            .and_then(V::from_value)
            .ok_or_else(|| ActionFault::Failed(format!("parameter {name} is missing or mistyped")))
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Access to the Thing instance from inside an action body.
///
/// Property writes go through validation and notify subscribers, exactly
/// like external writes.
pub struct ThingHandle<T> {
    instance: Arc<RwLock<T>>,
    shared: Arc<Shared>,
}

impl<T> Clone for ThingHandle<T> {
    fn clone(&self) -> Self {
        Self {
            instance: Arc::clone(&self.instance),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + Sync + 'static> ThingHandle<T> {
    pub(crate) fn new(instance: Arc<RwLock<T>>, shared: Arc<Shared>) -> Self {
        Self { instance, shared }
    }

    /// Name of the Thing.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Run `f` with shared access to the instance. Do not hold across `.await`.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.instance.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Write property `name` as if it came from a client.
    ///
    /// # Errors
    ///
    /// Same as [`ThingContext::set_property`](crate::context::ThingContext::set_property).
    pub fn set_property<V: ThingValue>(&self, name: &str, value: V) -> Result<Value, WebThingError> {
        self.shared.set_property(name, &value.into_value().to_json())
    }

    /// Emit event `name` with `payload`.
    ///
    /// # Errors
    ///
    /// See [`EventEmitter::emit`].
    pub fn emit<V: ThingValue>(&self, name: &str, payload: V) -> Result<(), WebThingError> {
        self.emitter().emit(name, payload)
    }

    #[must_use]
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter::new(Arc::clone(&self.shared))
    }
}

/// What an action body receives when it runs.
pub struct ActionInvocation<T> {
    pub id: ActionId,
    pub thing: ThingHandle<T>,
    pub input: ActionInput,
    cancellation: CancellationToken,
    services: Services,
}

impl<T> ActionInvocation<T> {
    /// Signal raised when a caller cancels this action or the Thing is torn down.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Injected service of type `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionFault::Failed`] when the runtime has no such service;
    /// declaring it with `inject_service` rules this out at registration.
    pub fn service<S: Send + Sync + 'static>(&self) -> Result<Arc<S>, ActionFault> {
        self.services.get::<S>().ok_or_else(|| {
            ActionFault::Failed(format!(
                "service {} is not available",
                std::any::type_name::<S>()
            ))
        })
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`ActionFault::Cancelled`] when cancellation wins.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ActionFault> {
        self.cancellation
            .run_until_cancelled(tokio::time::sleep(duration))
            .await
            .ok_or(ActionFault::Cancelled)
    }
}

type RunFn = Box<
    dyn Fn(ActionId, ActionInput, CancellationToken) -> BoxFuture<Result<(), ActionFault>>
        + Send
        + Sync,
>;

/// One action of one Thing instance.
pub struct ActionBinding {
    name: String,
    inputs: Vec<InputSchema>,
    run: RunFn,
}

impl ActionBinding {
    pub(crate) fn bind<T: Thing>(
        schema: &ActionSchema<T>,
        handle: &ThingHandle<T>,
        services: &Services,
    ) -> Self {
        let body = Arc::clone(&schema.body);
        let handle = handle.clone();
        let services = services.clone();
        let run: RunFn = Box::new(move |id, input, cancellation| {
            body(ActionInvocation {
                id,
                thing: handle.clone(),
                input,
                cancellation,
                services: services.clone(),
            })
        });

        Self {
            name: schema.name.clone(),
            inputs: schema.inputs.clone(),
            run,
        }
    }

    /// External name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn inputs(&self) -> &[InputSchema] {
        &self.inputs
    }

    /// Validate a wire input object against every declared parameter.
    ///
    /// Missing nullable parameters become `null`; unknown keys are ignored.
    /// Returns the values keyed by external parameter name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingParameter`] or a
    /// [`ValidationError::Parameter`] wrapping the first rejection.
    pub fn validate(&self, wire: &Map<String, Json>) -> Result<BTreeMap<String, Value>, ValidationError> {
        self.inputs
            .iter()
            .map(|input| {
                let name = input.descriptor.external_name();
                let value = match wire.get(name) {
                    None if input.descriptor.nullable => Value::Null,
                    None => {
                        return Err(ValidationError::MissingParameter {
                            name: name.to_string(),
                        });
                    }
                    Some(value) => input.validator.try_accept(value).map_err(|err| {
                        ValidationError::Parameter {
                            name: name.to_string(),
                            source: Box::new(err),
                        }
                    })?,
                };
                Ok((name.to_string(), value))
            })
            .collect()
    }

    /// Start the body with `values` (keyed by external name) and `cancellation`.
    pub(crate) fn run(
        &self,
        id: ActionId,
        values: &BTreeMap<String, Value>,
        cancellation: CancellationToken,
    ) -> BoxFuture<Result<(), ActionFault>> {
        let values = self
            .inputs
            .iter()
            .filter_map(|input| {
                values
                    .get(input.descriptor.external_name())
                    .map(|value| (input.descriptor.name.clone(), value.clone()))
            })
            .collect();
        (self.run)(id, ActionInput { values }, cancellation)
    }
}

/// All actions of one Thing instance.
pub struct ActionTable {
    bindings: Vec<Arc<ActionBinding>>,
    ignore_case: bool,
}

impl ActionTable {
    #[must_use]
    pub fn new(bindings: Vec<ActionBinding>, ignore_case: bool) -> Self {
        Self {
            bindings: bindings.into_iter().map(Arc::new).collect(),
            ignore_case,
        }
    }

    /// Look up an action by external name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no action has that name.
    pub fn find(&self, name: &str) -> Result<&Arc<ActionBinding>, NotFoundError> {
        self.bindings
            .iter()
            .find(|binding| same_name(binding.name(), name, self.ignore_case))
            .ok_or_else(|| NotFoundError::new("Action", name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|binding| binding.name())
    }
}
