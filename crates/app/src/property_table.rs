//! Property table: per-instance bindings of getter, setter and validator.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use webthing_domain::error::{NotFoundError, ValidationError, WebThingError};
use webthing_domain::member::MemberDescriptor;
use webthing_domain::message::OutboundMessage;
use webthing_domain::validation::Validator;
use webthing_domain::value::Value;

use crate::hub::NotificationHub;
use crate::introspect::{PropertySchema, same_name};

type ReadFn = Box<dyn Fn() -> Value + Send + Sync>;
type WriteFn = Box<dyn Fn(Value) -> Result<Value, ValidationError> + Send + Sync>;

/// One property of one Thing instance.
pub struct PropertyBinding {
    descriptor: MemberDescriptor,
    validator: Validator,
    read: ReadFn,
    write: Option<WriteFn>,
}

impl PropertyBinding {
    /// Bind the accessors of `schema` to `instance`.
    pub(crate) fn bind<T: Send + Sync + 'static>(
        schema: &PropertySchema<T>,
        instance: &Arc<RwLock<T>>,
    ) -> Self {
        let read: ReadFn = {
            let instance = Arc::clone(instance);
            let getter = Arc::clone(&schema.getter);
            Box::new(move || getter(&instance.read().unwrap_or_else(PoisonError::into_inner)))
        };

        let write = match (&schema.setter, schema.descriptor.read_only) {
            (Some(setter), false) => {
                let instance = Arc::clone(instance);
                let getter = Arc::clone(&schema.getter);
                let setter = Arc::clone(setter);
                let write: WriteFn = Box::new(move |value| {
                    let mut thing = instance.write().unwrap_or_else(PoisonError::into_inner);
                    setter(&mut thing, value)?;
                    Ok(getter(&thing))
                });
                Some(write)
            }
            _ => None,
        };

        Self {
            descriptor: schema.descriptor.clone(),
            validator: schema.validator.clone(),
            read,
            write,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.external_name()
    }

    #[must_use]
    pub fn get(&self) -> Value {
        (self.read)()
    }
}

/// All properties of one Thing instance.
pub struct PropertyTable {
    bindings: Vec<PropertyBinding>,
    ignore_case: bool,
    // Serialises commit and notification so subscribers see writes in order.
    commit: Mutex<()>,
}

impl PropertyTable {
    #[must_use]
    pub fn new(bindings: Vec<PropertyBinding>, ignore_case: bool) -> Self {
        Self {
            bindings,
            ignore_case,
            commit: Mutex::new(()),
        }
    }

    /// Look up a binding by external name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no property has that name.
    pub fn find(&self, name: &str) -> Result<&PropertyBinding, NotFoundError> {
        self.bindings
            .iter()
            .find(|binding| same_name(binding.name(), name, self.ignore_case))
            .ok_or_else(|| NotFoundError::new("Property", name))
    }

    /// Current value of `name`. No validation on read.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no property has that name.
    pub fn get_value(&self, name: &str) -> Result<Value, NotFoundError> {
        self.find(name).map(PropertyBinding::get)
    }

    /// Validate `wire`, apply it and notify `hub`.
    ///
    /// Returns the value read back after the write. A rejected value leaves
    /// the property untouched and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WebThingError::NotFound`] for an unknown name and
    /// [`WebThingError::Validation`] for a read-only property or a value
    /// that fails its constraints.
    pub fn set_value(
        &self,
        name: &str,
        wire: &serde_json::Value,
        hub: &NotificationHub,
    ) -> Result<Value, WebThingError> {
        let binding = self.find(name)?;
        let external = binding.name();

        let Some(write) = &binding.write else {
            tracing::debug!(property = external, "write to read-only property rejected");
            return Err(ValidationError::ReadOnly {
                name: external.to_string(),
            }
            .into());
        };

        let value = binding.validator.try_accept(wire).inspect_err(|err| {
            tracing::debug!(property = external, %err, "property value rejected");
        })?;

        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        let current = write(value)?;
        hub.publish(OutboundMessage::PropertyStatus {
            name: external.to_string(),
            value: current.clone(),
        });
        Ok(current)
    }

    /// Every property with its current value, in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<(String, Value)> {
        self.bindings
            .iter()
            .map(|binding| (binding.name().to_string(), binding.get()))
            .collect()
    }

    pub fn bindings(&self) -> impl Iterator<Item = &PropertyBinding> {
        self.bindings.iter()
    }
}
