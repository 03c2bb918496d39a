//! Declaration API: how a Rust type describes itself as a Thing.
//!
//! A type implements [`Thing`] and lists its members in
//! [`Thing::declare`]. Each declaration names a capability shape:
//!
//! - [`Members::property`]: a read accessor, exposed read-only
//! - [`Members::property_rw`]: a read/write accessor pair
//! - [`Members::action`]: an async body with ordered parameters
//! - [`Members::event`] / [`Members::signal`]: a fire-once occurrence
//!
//! ```ignore
//! impl Thing for Lamp {
//!     fn name(&self) -> String { "lamp".into() }
//!
//!     fn declare(members: &mut Members<Self>) {
//!         members
//!             .property_rw("level", |l: &Lamp| l.level, |l, v| l.level = v)
//!             .minimum(0)
//!             .maximum(100)
//!             .multiple_of(5);
//!         members
//!             .action("fade", fade)
//!             .param_with::<u8>("level", |p| {
//!                 p.maximum(100);
//!             })
//!             .inject_cancellation();
//!         members.event::<f64>("overheated").unit("degree celsius");
//!     }
//! }
//! ```

use std::any::TypeId;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use webthing_domain::error::{ActionFault, ValidationError};
use webthing_domain::member::{Bound, ConstraintSpec, Metadata};
use webthing_domain::value::{Shape, ThingValue, Value};

use crate::action_table::ActionInvocation;

/// Boxed, sendable future returned by action bodies once erased.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

pub(crate) type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
pub(crate) type Setter<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), ValidationError> + Send + Sync>;
pub(crate) type ActionBody<T> =
    Arc<dyn Fn(ActionInvocation<T>) -> BoxFuture<Result<(), ActionFault>> + Send + Sync>;

/// A domain type exposed as a Web Thing.
///
/// `name`, `title`, `description` and `types` form the base identity; they
/// are never exposed as properties.
pub trait Thing: Sized + Send + Sync + 'static {
    /// Unique name of this instance, used as its path segment.
    fn name(&self) -> String;

    fn title(&self) -> Option<String> {
        None
    }

    fn description(&self) -> Option<String> {
        None
    }

    /// Semantic type tags, rendered as `@type`.
    fn types(&self) -> Vec<String> {
        Vec::new()
    }

    /// List the members of this type. Called once per type and runtime.
    fn declare(members: &mut Members<Self>);
}

/// Options shared by every kind of declaration.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemberOptions {
    pub rename: Option<String>,
    pub ignore: bool,
    pub read_only: bool,
    pub metadata: Metadata,
    pub constraints: ConstraintSpec,
}

impl MemberOptions {
    pub fn external_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.rename.as_deref().unwrap_or(name)
    }
}

/// Collector passed to [`Thing::declare`].
pub struct Members<T> {
    pub(crate) properties: Vec<PropertyDecl<T>>,
    pub(crate) actions: Vec<ActionDecl<T>>,
    pub(crate) events: Vec<EventDecl>,
}

impl<T> Default for Members<T> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            actions: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl<T: Thing> Members<T> {
    /// Declare a read-only property backed by `get`.
    pub fn property<V, G>(&mut self, name: &str, get: G) -> &mut PropertyDecl<T>
    where
        V: ThingValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.push_property(PropertyDecl {
            name: name.to_string(),
            shape: V::shape(),
            getter: Arc::new(move |thing: &T| get(thing).into_value()),
            setter: None,
            options: MemberOptions::default(),
        })
    }

    /// Declare a writable property backed by `get` and `set`.
    pub fn property_rw<V, G, S>(&mut self, name: &str, get: G, set: S) -> &mut PropertyDecl<T>
    where
        V: ThingValue,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let shape = V::shape();
        let setter: Option<Setter<T>> = match shape {
            Shape::Supported { kind, .. } => Some(Arc::new(
                move |thing: &mut T, value: Value| -> Result<(), ValidationError> {
                    let typed = V::from_value(value)
                        .ok_or(ValidationError::KindMismatch { expected: kind })?;
                    set(thing, typed);
                    Ok(())
                },
            )),
            Shape::Unsupported { .. } => None,
        };
        self.push_property(PropertyDecl {
            name: name.to_string(),
            shape,
            getter: Arc::new(move |thing: &T| get(thing).into_value()),
            setter,
            options: MemberOptions::default(),
        })
    }

    /// Declare an action. Parameters are added on the returned declaration.
    pub fn action<F, Fut>(&mut self, name: &str, body: F) -> &mut ActionDecl<T>
    where
        F: Fn(ActionInvocation<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionFault>> + Send + 'static,
    {
        let body: ActionBody<T> = Arc::new(
            move |invocation: ActionInvocation<T>| -> BoxFuture<Result<(), ActionFault>> {
                Box::pin(body(invocation))
            },
        );
        let index = self.actions.len();
        self.actions.push(ActionDecl {
            name: name.to_string(),
            body,
            parameters: Vec::new(),
            options: MemberOptions::default(),
        });
        &mut self.actions[index]
    }

    /// Declare an event carrying a payload of type `V`.
    pub fn event<V: ThingValue>(&mut self, name: &str) -> &mut EventDecl {
        self.push_event(name, Some(V::shape()))
    }

    /// Declare an event without payload.
    pub fn signal(&mut self, name: &str) -> &mut EventDecl {
        self.push_event(name, None)
    }

    fn push_property(&mut self, decl: PropertyDecl<T>) -> &mut PropertyDecl<T> {
        let index = self.properties.len();
        self.properties.push(decl);
        &mut self.properties[index]
    }

    fn push_event(&mut self, name: &str, payload: Option<Shape>) -> &mut EventDecl {
        let index = self.events.len();
        self.events.push(EventDecl {
            name: name.to_string(),
            payload,
            options: MemberOptions::default(),
        });
        &mut self.events[index]
    }
}

/// A declared property.
pub struct PropertyDecl<T> {
    pub(crate) name: String,
    pub(crate) shape: Shape,
    pub(crate) getter: Getter<T>,
    pub(crate) setter: Option<Setter<T>>,
    pub(crate) options: MemberOptions,
}

impl<T> PropertyDecl<T> {
    /// Reject writes even though a setter exists.
    pub fn read_only(&mut self) -> &mut Self {
        self.options.read_only = true;
        self
    }
}

/// A parameter of an action, in declaration order.
pub(crate) enum Parameter {
    Input(ParamDecl),
    /// The body observes the caller's cancellation signal.
    Cancellation,
    /// The body needs a service from the runtime's registry.
    Service {
        type_id: TypeId,
        type_name: &'static str,
    },
}

/// A declared action.
pub struct ActionDecl<T> {
    pub(crate) name: String,
    pub(crate) body: ActionBody<T>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) options: MemberOptions,
}

impl<T> ActionDecl<T> {
    /// Add an input parameter without constraints.
    pub fn param<V: ThingValue>(&mut self, name: &str) -> &mut Self {
        self.param_with::<V>(name, |_| {})
    }

    /// Add an input parameter and configure it.
    pub fn param_with<V: ThingValue>(
        &mut self,
        name: &str,
        configure: impl FnOnce(&mut ParamDecl),
    ) -> &mut Self {
        let mut decl = ParamDecl {
            name: name.to_string(),
            shape: V::shape(),
            options: MemberOptions::default(),
        };
        configure(&mut decl);
        self.parameters.push(Parameter::Input(decl));
        self
    }

    /// The body reads [`ActionInvocation::cancellation`].
    pub fn inject_cancellation(&mut self) -> &mut Self {
        self.parameters.push(Parameter::Cancellation);
        self
    }

    /// The body reads a service of type `S` through [`ActionInvocation::service`].
    ///
    /// Registration fails when the runtime provides no such service.
    pub fn inject_service<S: Send + Sync + 'static>(&mut self) -> &mut Self {
        self.parameters.push(Parameter::Service {
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
        });
        self
    }
}

/// A declared action parameter.
pub struct ParamDecl {
    pub(crate) name: String,
    pub(crate) shape: Shape,
    pub(crate) options: MemberOptions,
}

/// A declared event.
pub struct EventDecl {
    pub(crate) name: String,
    pub(crate) payload: Option<Shape>,
    pub(crate) options: MemberOptions,
}

macro_rules! describe_options {
    ($($decl:ident $(<$generic:ident>)?),+) => {
        $(impl$(<$generic>)? $decl$(<$generic>)? {
            /// Expose under another name.
            pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
                self.options.rename = Some(name.into());
                self
            }

            pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
                self.options.metadata.title = Some(title.into());
                self
            }

            pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
                self.options.metadata.description = Some(description.into());
                self
            }

            pub fn unit(&mut self, unit: impl Into<String>) -> &mut Self {
                self.options.metadata.unit = Some(unit.into());
                self
            }

            /// Semantic annotation, rendered as `@type`.
            pub fn semantic_type(&mut self, semantic_type: impl Into<String>) -> &mut Self {
                self.options.metadata.semantic_type = Some(semantic_type.into());
                self
            }
        })+
    };
}

describe_options!(PropertyDecl<T>, ActionDecl<T>, EventDecl, ParamDecl);

macro_rules! ignore_option {
    ($($decl:ident $(<$generic:ident>)?),+) => {
        $(impl$(<$generic>)? $decl$(<$generic>)? {
            /// Leave this member out of the Thing entirely.
            pub fn ignore(&mut self) -> &mut Self {
                self.options.ignore = true;
                self
            }
        })+
    };
}

ignore_option!(PropertyDecl<T>, ActionDecl<T>, EventDecl);

macro_rules! constraint_options {
    ($($decl:ident $(<$generic:ident>)?),+) => {
        $(impl$(<$generic>)? $decl$(<$generic>)? {
            pub fn minimum(&mut self, bound: impl Into<Bound>) -> &mut Self {
                self.options.constraints.minimum = Some(bound.into());
                self
            }

            pub fn maximum(&mut self, bound: impl Into<Bound>) -> &mut Self {
                self.options.constraints.maximum = Some(bound.into());
                self
            }

            pub fn exclusive_minimum(&mut self, bound: impl Into<Bound>) -> &mut Self {
                self.options.constraints.exclusive_minimum = Some(bound.into());
                self
            }

            pub fn exclusive_maximum(&mut self, bound: impl Into<Bound>) -> &mut Self {
                self.options.constraints.exclusive_maximum = Some(bound.into());
                self
            }

            pub fn multiple_of(&mut self, bound: impl Into<Bound>) -> &mut Self {
                self.options.constraints.multiple_of = Some(bound.into());
                self
            }

            pub fn min_length(&mut self, length: usize) -> &mut Self {
                self.options.constraints.minimum_length = Some(length);
                self
            }

            pub fn max_length(&mut self, length: usize) -> &mut Self {
                self.options.constraints.maximum_length = Some(length);
                self
            }

            pub fn pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
                self.options.constraints.pattern = Some(pattern.into());
                self
            }

            /// Restrict accepted values to `values`, given as wire JSON.
            pub fn enum_values<I, J>(&mut self, values: I) -> &mut Self
            where
                I: IntoIterator<Item = J>,
                J: Into<serde_json::Value>,
            {
                self.options.constraints.enumeration = values.into_iter().map(Into::into).collect();
                self
            }
        })+
    };
}

constraint_options!(PropertyDecl<T>, ParamDecl);

#[cfg(test)]
mod tests {
    use super::*;
    use webthing_domain::kind::Kind;

    struct Fan {
        speed: u8,
        label: Option<String>,
    }

    impl Thing for Fan {
        fn name(&self) -> String {
            "fan".to_string()
        }

        fn declare(members: &mut Members<Self>) {
            members
                .property_rw("speed", |f: &Fan| f.speed, |f, v| f.speed = v)
                .maximum(3)
                .title("Speed");
            members.property("label", |f: &Fan| f.label.clone());
            members
                .action("boost", |_invocation| async { Ok(()) })
                .param_with::<u8>("level", |p| {
                    p.minimum(1).unit("step");
                })
                .inject_cancellation();
            members.signal("stalled").description("Blade blocked");
        }
    }

    fn members() -> Members<Fan> {
        let mut members = Members::default();
        Fan::declare(&mut members);
        members
    }

    #[test]
    fn should_collect_every_declaration_in_order() {
        let members = members();
        assert_eq!(members.properties.len(), 2);
        assert_eq!(members.actions.len(), 1);
        assert_eq!(members.events.len(), 1);
        assert_eq!(members.properties[0].name, "speed");
        assert_eq!(members.properties[1].name, "label");
    }

    #[test]
    fn should_record_options_on_property() {
        let members = members();
        let speed = &members.properties[0];
        assert_eq!(speed.options.metadata.title.as_deref(), Some("Speed"));
        assert_eq!(speed.options.constraints.maximum, Some(Bound::Int(3)));
        assert!(speed.setter.is_some());
    }

    #[test]
    fn should_have_no_setter_for_read_accessor() {
        let members = members();
        let label = &members.properties[1];
        assert!(label.setter.is_none());
        assert_eq!(
            label.shape,
            Shape::Supported {
                kind: Kind::String,
                nullable: true,
                variants: None
            }
        );
    }

    #[test]
    fn should_apply_typed_value_through_setter() {
        let members = members();
        let setter = members.properties[0].setter.clone().unwrap();
        let getter = members.properties[0].getter.clone();
        let mut fan = Fan {
            speed: 0,
            label: None,
        };
        setter(&mut fan, Value::U8(2)).unwrap();
        assert_eq!(getter(&fan), Value::U8(2));
        assert_eq!(
            setter(&mut fan, Value::I32(2)),
            Err(ValidationError::KindMismatch {
                expected: Kind::UInt8
            })
        );
    }

    #[test]
    fn should_keep_parameter_order_including_injections() {
        let members = members();
        let params = &members.actions[0].parameters;
        assert_eq!(params.len(), 2);
        assert!(matches!(&params[0], Parameter::Input(p) if p.name == "level"));
        assert!(matches!(params[1], Parameter::Cancellation));
    }

    #[test]
    fn should_record_signal_without_payload() {
        let members = members();
        assert!(members.events[0].payload.is_none());
        assert_eq!(
            members.events[0].options.metadata.description.as_deref(),
            Some("Blade blocked")
        );
    }
}
