//! Metadata introspector: turns a [`Thing`]'s declarations into an
//! immutable, validated schema.
//!
//! Runs once per type; [`SchemaCache`] shares the result between instances.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use webthing_domain::error::RegistrationError;
use webthing_domain::member::{ConstraintSpec, Constraints, MemberDescriptor, Metadata};
use webthing_domain::validation::Validator;
use webthing_domain::value::Shape;

use crate::services::Services;
use crate::thing::{
    ActionBody, EventDecl, Getter, MemberOptions, Members, ParamDecl, Parameter, PropertyDecl,
    Setter, Thing,
};

/// Names owned by the Thing's base identity; members using them are skipped.
pub const BASE_IDENTITY: &[&str] = &[
    "name",
    "title",
    "description",
    "@type",
    "@context",
    "id",
    "links",
];

/// Compare member names, honouring the case-insensitivity option.
pub(crate) fn same_name(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

pub struct PropertySchema<T> {
    pub descriptor: MemberDescriptor,
    pub validator: Validator,
    pub(crate) getter: Getter<T>,
    pub(crate) setter: Option<Setter<T>>,
}

/// A caller-supplied action parameter.
#[derive(Debug, Clone)]
pub struct InputSchema {
    pub descriptor: MemberDescriptor,
    pub validator: Validator,
}

/// A parameter supplied by the scheduler rather than the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Cancellation,
    Service {
        type_id: TypeId,
        type_name: &'static str,
    },
}

pub struct ActionSchema<T> {
    /// External name.
    pub name: String,
    pub metadata: Metadata,
    pub inputs: Vec<InputSchema>,
    pub injections: Vec<Injection>,
    pub(crate) body: ActionBody<T>,
}

#[derive(Debug, Clone)]
pub struct EventSchema {
    /// External name.
    pub name: String,
    pub metadata: Metadata,
    /// Payload description, named after the event. `None` for signals.
    pub payload: Option<MemberDescriptor>,
}

/// Everything known about a Thing type after introspection.
pub struct ThingSchema<T> {
    pub properties: Vec<PropertySchema<T>>,
    pub actions: Vec<ActionSchema<T>>,
    pub events: Vec<EventSchema>,
}

impl<T> ThingSchema<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.actions.is_empty() && self.events.is_empty()
    }
}

/// Introspect `T`.
///
/// # Errors
///
/// Returns a [`RegistrationError`] when the type exposes no member, declares
/// a name twice, carries a constraint that does not fit its kind, or needs a
/// service missing from `services`.
pub fn introspect<T: Thing>(
    services: &Services,
    ignore_case: bool,
) -> Result<ThingSchema<T>, RegistrationError> {
    let mut members = Members::<T>::default();
    T::declare(&mut members);

    let thing = std::any::type_name::<T>();
    let mut schema = ThingSchema {
        properties: Vec::new(),
        actions: Vec::new(),
        events: Vec::new(),
    };

    for decl in members.properties {
        if let Some(property) = property_schema(thing, decl)? {
            ensure_unique(
                schema.properties.iter().map(|p| p.descriptor.external_name()),
                property.descriptor.external_name(),
                ignore_case,
            )?;
            schema.properties.push(property);
        }
    }

    for decl in members.actions {
        let external = decl.options.external_name(&decl.name).to_string();
        if !accepted(thing, &decl.name, &external, &decl.options) {
            continue;
        }
        ensure_unique(
            schema.actions.iter().map(|a| a.name.as_str()),
            &external,
            ignore_case,
        )?;

        let mut inputs: Vec<InputSchema> = Vec::new();
        let mut injections = Vec::new();
        for parameter in decl.parameters {
            match parameter {
                Parameter::Input(param) => {
                    let Some(input) = input_schema(thing, param)? else {
                        continue;
                    };
                    ensure_unique(
                        inputs.iter().map(|i| i.descriptor.external_name()),
                        input.descriptor.external_name(),
                        ignore_case,
                    )
                    .map_err(|_| RegistrationError::DuplicateMember {
                        member: format!("{external}.{}", input.descriptor.external_name()),
                    })?;
                    inputs.push(input);
                }
                Parameter::Cancellation => injections.push(Injection::Cancellation),
                Parameter::Service { type_id, type_name } => {
                    if !services.contains(type_id) {
                        return Err(RegistrationError::MissingService {
                            action: external,
                            service: type_name,
                        });
                    }
                    injections.push(Injection::Service { type_id, type_name });
                }
            }
        }

        schema.actions.push(ActionSchema {
            name: external,
            metadata: decl.options.metadata,
            inputs,
            injections,
            body: decl.body,
        });
    }

    for decl in members.events {
        if let Some(event) = event_schema(thing, decl)? {
            ensure_unique(
                schema.events.iter().map(|e| e.name.as_str()),
                &event.name,
                ignore_case,
            )?;
            schema.events.push(event);
        }
    }

    if schema.is_empty() {
        return Err(RegistrationError::NoMembers {
            thing: thing.to_string(),
        });
    }

    tracing::debug!(
        thing,
        properties = schema.properties.len(),
        actions = schema.actions.len(),
        events = schema.events.len(),
        "thing type introspected"
    );
    Ok(schema)
}

fn accepted(thing: &str, name: &str, external: &str, options: &MemberOptions) -> bool {
    if options.ignore {
        tracing::debug!(thing, member = name, "member ignored");
        return false;
    }
    if BASE_IDENTITY.contains(&external) {
        tracing::debug!(thing, member = name, "member shadows base identity, skipped");
        return false;
    }
    true
}

fn ensure_unique<'a>(
    mut existing: impl Iterator<Item = &'a str>,
    name: &str,
    ignore_case: bool,
) -> Result<(), RegistrationError> {
    if existing.any(|other| same_name(other, name, ignore_case)) {
        Err(RegistrationError::DuplicateMember {
            member: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn describe(
    thing: &str,
    name: &str,
    shape: Shape,
    options: MemberOptions,
    read_only: bool,
) -> Result<Option<MemberDescriptor>, RegistrationError> {
    let (kind, nullable, variants) = match shape {
        Shape::Supported {
            kind,
            nullable,
            variants,
        } => (kind, nullable, variants),
        Shape::Unsupported { type_name } => {
            tracing::debug!(thing, member = name, type_name, "unsupported kind, skipped");
            return Ok(None);
        }
    };

    let rename = options.rename;
    let external = rename.as_deref().unwrap_or(name);
    let constraints = Constraints::resolve(external, kind, variants, options.constraints)?;

    Ok(Some(MemberDescriptor {
        name: name.to_string(),
        rename,
        kind,
        nullable,
        read_only: read_only || options.read_only,
        constraints,
        metadata: options.metadata,
    }))
}

fn property_schema<T>(
    thing: &str,
    decl: PropertyDecl<T>,
) -> Result<Option<PropertySchema<T>>, RegistrationError> {
    let external = decl.options.external_name(&decl.name).to_string();
    if !accepted(thing, &decl.name, &external, &decl.options) {
        return Ok(None);
    }

    let read_only = decl.setter.is_none();
    let Some(descriptor) = describe(thing, &decl.name, decl.shape, decl.options, read_only)? else {
        return Ok(None);
    };
    let validator = Validator::new(&descriptor);
    Ok(Some(PropertySchema {
        descriptor,
        validator,
        getter: decl.getter,
        setter: decl.setter,
    }))
}

fn input_schema(thing: &str, decl: ParamDecl) -> Result<Option<InputSchema>, RegistrationError> {
    let Some(descriptor) = describe(thing, &decl.name, decl.shape, decl.options, false)? else {
        return Ok(None);
    };
    let validator = Validator::new(&descriptor);
    Ok(Some(InputSchema {
        descriptor,
        validator,
    }))
}

fn event_schema(thing: &str, decl: EventDecl) -> Result<Option<EventSchema>, RegistrationError> {
    let external = decl.options.external_name(&decl.name).to_string();
    if !accepted(thing, &decl.name, &external, &decl.options) {
        return Ok(None);
    }

    let payload = match decl.payload {
        None => None,
        Some(shape) => {
            let options = MemberOptions {
                rename: decl.options.rename.clone(),
                metadata: decl.options.metadata.clone(),
                constraints: ConstraintSpec::default(),
                ..MemberOptions::default()
            };
            let Some(descriptor) = describe(thing, &decl.name, shape, options, true)? else {
                return Ok(None);
            };
            Some(descriptor)
        }
    };

    Ok(Some(EventSchema {
        name: external,
        metadata: decl.options.metadata,
        payload,
    }))
}

/// Per-type schema cache owned by a runtime.
#[derive(Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema of `T`, introspecting it on first use.
    ///
    /// # Errors
    ///
    /// Propagates the [`RegistrationError`] of [`introspect`]; failures are
    /// not cached.
    pub fn get_or_introspect<T: Thing>(
        &self,
        services: &Services,
        ignore_case: bool,
    ) -> Result<Arc<ThingSchema<T>>, RegistrationError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let type_id = TypeId::of::<T>();
        if let Some(schema) = entries
            .get(&type_id)
            .and_then(|entry| Arc::clone(entry).downcast::<ThingSchema<T>>().ok())
        {
            return Ok(schema);
        }

        let schema = Arc::new(introspect::<T>(services, ignore_case)?);
        entries.insert(type_id, Arc::clone(&schema) as Arc<dyn Any + Send + Sync>);
        Ok(schema)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
