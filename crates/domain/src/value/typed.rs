//! Mapping between Rust types and primitive kinds.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::Value;
use crate::kind::Kind;

/// What a Rust type looks like to the introspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A member of one of the primitive kinds.
    Supported {
        kind: Kind,
        nullable: bool,
        /// Variant names, for [`Kind::Enum`] only.
        variants: Option<&'static [&'static str]>,
    },
    /// A type the protocol cannot express; such members are skipped.
    Unsupported { type_name: &'static str },
}

impl Shape {
    #[must_use]
    pub const fn supported(kind: Kind) -> Self {
        Self::Supported {
            kind,
            nullable: false,
            variants: None,
        }
    }

    #[must_use]
    pub const fn enumeration(variants: &'static [&'static str]) -> Self {
        Self::Supported {
            kind: Kind::Enum,
            nullable: false,
            variants: Some(variants),
        }
    }

    #[must_use]
    pub fn unsupported<T>() -> Self {
        Self::Unsupported {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Same shape, but accepting an absent value.
    #[must_use]
    pub const fn nullable(self) -> Self {
        match self {
            Self::Supported { kind, variants, .. } => Self::Supported {
                kind,
                nullable: true,
                variants,
            },
            unsupported @ Self::Unsupported { .. } => unsupported,
        }
    }
}

/// A Rust type that can flow through property accessors and action inputs.
///
/// Implemented for the primitive types, `Option<T>` (nullable) and, through
/// [`thing_enum!`](crate::thing_enum), for enumerations.
pub trait ThingValue: Sized + Send + Sync + 'static {
    fn shape() -> Shape;

    fn into_value(self) -> Value;

    /// Recover the Rust value. `None` when `value` is of another kind.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! primitive {
    ($($ty:ty => $kind:ident / $variant:ident),+ $(,)?) => {
        $(
            impl ThingValue for $ty {
                fn shape() -> Shape {
                    Shape::supported(Kind::$kind)
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+
    };
}

primitive! {
    bool => Boolean / Bool,
    i8 => Int8 / I8,
    i16 => Int16 / I16,
    i32 => Int32 / I32,
    i64 => Int64 / I64,
    u8 => UInt8 / U8,
    u16 => UInt16 / U16,
    u32 => UInt32 / U32,
    u64 => UInt64 / U64,
    f32 => Float32 / F32,
    f64 => Float64 / F64,
    Decimal => Decimal / Decimal,
    char => Char / Char,
    String => String / String,
    Uuid => Uuid / Uuid,
    NaiveDateTime => DateTime / DateTime,
    DateTime<FixedOffset> => DateTimeOffset / DateTimeOffset,
    TimeDelta => Duration / Duration,
}

impl<T: ThingValue> ThingValue for Option<T> {
    fn shape() -> Shape {
        T::shape().nullable()
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, ThingValue::into_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Collections have no primitive kind; the introspector skips them.
impl<T: Send + Sync + 'static> ThingValue for Vec<T> {
    fn shape() -> Shape {
        Shape::unsupported::<Self>()
    }

    fn into_value(self) -> Value {
        Value::Null
    }

    fn from_value(_value: Value) -> Option<Self> {
        None
    }
}

/// Free-form JSON has no primitive kind; the introspector skips it.
impl ThingValue for serde_json::Value {
    fn shape() -> Shape {
        Shape::unsupported::<Self>()
    }

    fn into_value(self) -> Value {
        Value::Null
    }

    fn from_value(_value: Value) -> Option<Self> {
        None
    }
}

/// Declare a fieldless enum usable as a Thing member of [`Kind::Enum`].
///
/// The enum derives `Debug, Clone, Copy, PartialEq, Eq, Hash`; its variant
/// names become the enumerated values on the wire.
///
/// ```
/// webthing_domain::thing_enum! {
///     pub enum Mode { Eco, Comfort, Boost }
/// }
/// assert_eq!(Mode::VARIANTS, &["Eco", "Comfort", "Boost"]);
/// ```
#[macro_export]
macro_rules! thing_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Variant names, in declaration order.
            pub const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];

            /// Wire name of this variant.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::value::ThingValue for $name {
            fn shape() -> $crate::value::Shape {
                $crate::value::Shape::enumeration(Self::VARIANTS)
            }

            fn into_value(self) -> $crate::value::Value {
                $crate::value::Value::Enum(self.as_str().to_string())
            }

            fn from_value(value: $crate::value::Value) -> Option<Self> {
                match value {
                    $crate::value::Value::Enum(name) => match name.as_str() {
                        $(stringify!($variant) => Some(Self::$variant),)+
                        _ => None,
                    },
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::thing_enum! {
        enum Speed { Low, High }
    }

    #[test]
    fn should_map_primitive_to_its_kind() {
        assert_eq!(u8::shape(), Shape::supported(Kind::UInt8));
        assert_eq!(TimeDelta::shape(), Shape::supported(Kind::Duration));
    }

    #[test]
    fn should_mark_option_as_nullable() {
        assert_eq!(
            Option::<String>::shape(),
            Shape::Supported {
                kind: Kind::String,
                nullable: true,
                variants: None
            }
        );
    }

    #[test]
    fn should_convert_none_to_null_and_back() {
        assert_eq!(None::<i32>.into_value(), Value::Null);
        assert_eq!(Option::<i32>::from_value(Value::Null), Some(None));
        assert_eq!(Option::<i32>::from_value(Value::I32(4)), Some(Some(4)));
    }

    #[test]
    fn should_refuse_value_of_other_kind() {
        assert_eq!(u8::from_value(Value::U16(3)), None);
        assert_eq!(String::from_value(Value::Null), None);
    }

    #[test]
    fn should_report_collections_as_unsupported() {
        assert!(matches!(Vec::<u8>::shape(), Shape::Unsupported { .. }));
        assert!(matches!(Option::<Vec<u8>>::shape(), Shape::Unsupported { .. }));
    }

    #[test]
    fn should_expose_enum_variant_names() {
        assert_eq!(
            Speed::shape(),
            Shape::Supported {
                kind: Kind::Enum,
                nullable: false,
                variants: Some(&["Low", "High"])
            }
        );
        assert_eq!(Speed::High.into_value(), Value::Enum("High".to_string()));
        assert_eq!(Speed::from_value(Value::Enum("Low".into())), Some(Speed::Low));
        assert_eq!(Speed::from_value(Value::Enum("Medium".into())), None);
    }
}
