//! Member descriptors: immutable metadata for properties, action parameters
//! and event payloads.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::RegistrationError;
use crate::kind::Kind;
use crate::validation::coerce;
use crate::value::Value;

/// A numeric bound as written in a declaration, before it is converted into
/// the member's own kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

macro_rules! bound_from_int {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Bound {
            fn from(value: $ty) -> Self {
                Self::Int(i128::from(value))
            }
        })+
    };
}

bound_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<f32> for Bound {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for Bound {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Decimal(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl Bound {
    /// Convert into a value of `kind`, `None` if not exactly representable.
    #[must_use]
    pub fn to_value(self, kind: Kind) -> Option<Value> {
        let integral = match self {
            Self::Int(v) => Some(v),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 1e38 => Some(v as i128),
            Self::Float(_) => None,
            Self::Decimal(v) if v.fract().is_zero() => v.to_i128(),
            Self::Decimal(_) => None,
        };

        match kind {
            Kind::Int8 => integral.and_then(|v| i8::try_from(v).ok()).map(Value::I8),
            Kind::Int16 => integral.and_then(|v| i16::try_from(v).ok()).map(Value::I16),
            Kind::Int32 => integral.and_then(|v| i32::try_from(v).ok()).map(Value::I32),
            Kind::Int64 => integral.and_then(|v| i64::try_from(v).ok()).map(Value::I64),
            Kind::UInt8 => integral.and_then(|v| u8::try_from(v).ok()).map(Value::U8),
            Kind::UInt16 => integral.and_then(|v| u16::try_from(v).ok()).map(Value::U16),
            Kind::UInt32 => integral.and_then(|v| u32::try_from(v).ok()).map(Value::U32),
            Kind::UInt64 => integral.and_then(|v| u64::try_from(v).ok()).map(Value::U64),
            Kind::Float32 => self
                .as_f64()
                .map(narrow)
                .filter(|v| v.is_finite())
                .map(Value::F32),
            Kind::Float64 => self.as_f64().filter(|v| v.is_finite()).map(Value::F64),
            Kind::Decimal => match self {
                Self::Int(v) => i64::try_from(v).ok().map(Decimal::from),
                Self::Float(v) => Decimal::from_str(&v.to_string()).ok(),
                Self::Decimal(v) => Some(v),
            }
            .map(Value::Decimal),
            _ => None,
        }
    }

    fn as_f64(self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Decimal(v) => v.to_f64(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(value: f64) -> f32 {
    value as f32
}

/// Constraints exactly as declared, not yet checked against the member's kind.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSpec {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub exclusive_minimum: Option<Bound>,
    pub exclusive_maximum: Option<Bound>,
    pub multiple_of: Option<Bound>,
    pub minimum_length: Option<usize>,
    pub maximum_length: Option<usize>,
    pub pattern: Option<String>,
    pub enumeration: Vec<serde_json::Value>,
}

/// A compiled regular expression that remembers its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Constraints resolved into the member's native kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub exclusive_minimum: Option<Value>,
    pub exclusive_maximum: Option<Value>,
    pub multiple_of: Option<Value>,
    pub minimum_length: Option<usize>,
    pub maximum_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub enumeration: Vec<Value>,
}

impl Constraints {
    /// Check `spec` against `kind` and convert every bound into that kind.
    ///
    /// For [`Kind::Enum`] members the enumerated values are the type's
    /// `variants`; declared enumeration overrides are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] when a constraint does not apply to
    /// the kind, a bound cannot be represented in it, `multipleOf` is not
    /// positive, or the pattern does not compile.
    pub fn resolve(
        member: &str,
        kind: Kind,
        variants: Option<&[&str]>,
        spec: ConstraintSpec,
    ) -> Result<Self, RegistrationError> {
        let numeric = |constraint: &'static str,
                       bound: Option<Bound>|
         -> Result<Option<Value>, RegistrationError> {
            let Some(bound) = bound else {
                return Ok(None);
            };
            if !kind.is_numeric() {
                return Err(RegistrationError::InvalidConstraint {
                    member: member.to_string(),
                    constraint,
                    kind,
                });
            }
            bound
                .to_value(kind)
                .map(Some)
                .ok_or_else(|| RegistrationError::UnrepresentableBound {
                    member: member.to_string(),
                    constraint,
                    value: bound.to_string(),
                    kind,
                })
        };

        let minimum = numeric("minimum", spec.minimum)?;
        let maximum = numeric("maximum", spec.maximum)?;
        let exclusive_minimum = numeric("exclusiveMinimum", spec.exclusive_minimum)?;
        let exclusive_maximum = numeric("exclusiveMaximum", spec.exclusive_maximum)?;
        let multiple_of = numeric("multipleOf", spec.multiple_of)?;

        if let Some(divisor) = &multiple_of {
            let zero = Bound::Int(0).to_value(kind).unwrap_or(Value::Null);
            if divisor.compare(&zero) != Some(Ordering::Greater) {
                return Err(RegistrationError::UnrepresentableBound {
                    member: member.to_string(),
                    constraint: "multipleOf",
                    value: divisor.to_string(),
                    kind,
                });
            }
        }

        let text_only = |constraint: &'static str, present: bool| -> Result<(), RegistrationError> {
            if present && !kind.is_string() {
                Err(RegistrationError::InvalidConstraint {
                    member: member.to_string(),
                    constraint,
                    kind,
                })
            } else {
                Ok(())
            }
        };
        text_only("minLength", spec.minimum_length.is_some())?;
        text_only("maxLength", spec.maximum_length.is_some())?;
        text_only("pattern", spec.pattern.is_some())?;

        let pattern = spec
            .pattern
            .map(|source| {
                Regex::new(&source)
                    .map(|regex| Pattern { source, regex })
                    .map_err(|source| RegistrationError::InvalidPattern {
                        member: member.to_string(),
                        source,
                    })
            })
            .transpose()?;

        let enumeration = match variants {
            Some(variants) => variants
                .iter()
                .map(|name| Value::Enum((*name).to_string()))
                .collect(),
            None => spec
                .enumeration
                .iter()
                .map(|wire| {
                    coerce(kind, wire).map_err(|_| RegistrationError::UnrepresentableBound {
                        member: member.to_string(),
                        constraint: "enum",
                        value: wire.to_string(),
                        kind,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self {
            minimum,
            maximum,
            exclusive_minimum,
            exclusive_maximum,
            multiple_of,
            minimum_length: spec.minimum_length,
            maximum_length: spec.maximum_length,
            pattern,
            enumeration,
        })
    }
}

/// Human-facing metadata carried into the descriptor document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    /// Semantic annotation rendered as `@type`.
    pub semantic_type: Option<String>,
}

/// Immutable description of one property, action parameter or event payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    /// Name as declared on the Rust type.
    pub name: String,
    /// Name exposed on the wire, when it differs from [`name`](Self::name).
    pub rename: Option<String>,
    pub kind: Kind,
    pub nullable: bool,
    pub read_only: bool,
    pub constraints: Constraints,
    pub metadata: Metadata,
}

impl MemberDescriptor {
    /// The name used on the wire.
    #[must_use]
    pub fn external_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ConstraintSpec {
        ConstraintSpec::default()
    }

    #[test]
    fn should_convert_integer_bounds_into_member_kind() {
        let constraints = Constraints::resolve(
            "level",
            Kind::UInt8,
            None,
            ConstraintSpec {
                minimum: Some(0.into()),
                maximum: Some(100.into()),
                multiple_of: Some(5.into()),
                ..spec()
            },
        )
        .unwrap();
        assert_eq!(constraints.minimum, Some(Value::U8(0)));
        assert_eq!(constraints.maximum, Some(Value::U8(100)));
        assert_eq!(constraints.multiple_of, Some(Value::U8(5)));
    }

    #[test]
    fn should_reject_bound_outside_member_range() {
        let result = Constraints::resolve(
            "level",
            Kind::UInt8,
            None,
            ConstraintSpec {
                minimum: Some((-1).into()),
                ..spec()
            },
        );
        assert!(matches!(
            result,
            Err(RegistrationError::UnrepresentableBound { constraint: "minimum", .. })
        ));
    }

    #[test]
    fn should_reject_fractional_bound_for_integer_kind() {
        let result = Constraints::resolve(
            "level",
            Kind::Int32,
            None,
            ConstraintSpec {
                maximum: Some(1.5.into()),
                ..spec()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn should_accept_integral_float_bound_for_integer_kind() {
        let constraints = Constraints::resolve(
            "level",
            Kind::Int32,
            None,
            ConstraintSpec {
                maximum: Some(10.0.into()),
                ..spec()
            },
        )
        .unwrap();
        assert_eq!(constraints.maximum, Some(Value::I32(10)));
    }

    #[test]
    fn should_reject_non_positive_multiple_of() {
        let result = Constraints::resolve(
            "level",
            Kind::Float64,
            None,
            ConstraintSpec {
                multiple_of: Some(0.0.into()),
                ..spec()
            },
        );
        assert!(matches!(
            result,
            Err(RegistrationError::UnrepresentableBound { constraint: "multipleOf", .. })
        ));
    }

    #[test]
    fn should_reject_range_on_string_kind() {
        let result = Constraints::resolve(
            "label",
            Kind::String,
            None,
            ConstraintSpec {
                minimum: Some(1.into()),
                ..spec()
            },
        );
        assert!(matches!(
            result,
            Err(RegistrationError::InvalidConstraint { constraint: "minimum", .. })
        ));
    }

    #[test]
    fn should_reject_pattern_on_numeric_kind() {
        let result = Constraints::resolve(
            "level",
            Kind::Int32,
            None,
            ConstraintSpec {
                pattern: Some("^a".into()),
                ..spec()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn should_report_invalid_pattern() {
        let result = Constraints::resolve(
            "label",
            Kind::String,
            None,
            ConstraintSpec {
                pattern: Some("(".into()),
                ..spec()
            },
        );
        assert!(matches!(result, Err(RegistrationError::InvalidPattern { .. })));
    }

    #[test]
    fn should_coerce_declared_enumeration_into_kind() {
        let constraints = Constraints::resolve(
            "level",
            Kind::Int16,
            None,
            ConstraintSpec {
                enumeration: vec![serde_json::json!(1), serde_json::json!(2)],
                ..spec()
            },
        )
        .unwrap();
        assert_eq!(constraints.enumeration, vec![Value::I16(1), Value::I16(2)]);
    }

    #[test]
    fn should_derive_enumeration_from_variants_and_ignore_overrides() {
        let constraints = Constraints::resolve(
            "mode",
            Kind::Enum,
            Some(&["Eco", "Boost"]),
            ConstraintSpec {
                enumeration: vec![serde_json::json!("Other")],
                ..spec()
            },
        )
        .unwrap();
        assert_eq!(
            constraints.enumeration,
            vec![Value::Enum("Eco".into()), Value::Enum("Boost".into())]
        );
    }

    #[test]
    fn should_convert_float_bound_into_decimal() {
        let value = Bound::from(0.1).to_value(Kind::Decimal);
        assert_eq!(value, Some(Value::Decimal(Decimal::from_str("0.1").unwrap())));
    }

    #[test]
    fn should_prefer_rename_as_external_name() {
        let descriptor = MemberDescriptor {
            name: "brightness".into(),
            rename: Some("level".into()),
            kind: Kind::UInt8,
            nullable: false,
            read_only: false,
            constraints: Constraints::default(),
            metadata: Metadata::default(),
        };
        assert_eq!(descriptor.external_name(), "level");
    }
}
