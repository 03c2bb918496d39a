//! Constraint validators: accept or reject externally supplied JSON values.
//!
//! Checks run in a fixed order: null shortcut, kind check and coercion,
//! range / length / pattern, `multipleOf`, enumeration membership. Every
//! check is pure; a rejection leaves no trace.

mod coerce;

pub use coerce::coerce;

use std::cmp::Ordering;

use crate::error::ValidationError;
use crate::kind::Kind;
use crate::member::{Constraints, MemberDescriptor};
use crate::value::Value;

/// Validator for one member, built once from its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    kind: Kind,
    nullable: bool,
    constraints: Constraints,
}

impl Validator {
    #[must_use]
    pub fn new(descriptor: &MemberDescriptor) -> Self {
        Self {
            kind: descriptor.kind,
            nullable: descriptor.nullable,
            constraints: descriptor.constraints.clone(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Accept `wire` and return its typed value, or explain the rejection.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn try_accept(&self, wire: &serde_json::Value) -> Result<Value, ValidationError> {
        if wire.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(ValidationError::NullNotAllowed)
            };
        }

        let value = coerce(self.kind, wire)?;
        self.check_range(&value)?;
        self.check_text(&value)?;
        self.check_multiple_of(&value)?;
        self.check_enumeration(&value)?;
        Ok(value)
    }

    fn check_range(&self, value: &Value) -> Result<(), ValidationError> {
        let c = &self.constraints;

        if let Some(minimum) = &c.minimum
            && value.compare(minimum) == Some(Ordering::Less)
        {
            return Err(ValidationError::BelowMinimum {
                minimum: minimum.to_string(),
            });
        }
        if let Some(maximum) = &c.maximum
            && value.compare(maximum) == Some(Ordering::Greater)
        {
            return Err(ValidationError::AboveMaximum {
                maximum: maximum.to_string(),
            });
        }
        if let Some(bound) = &c.exclusive_minimum
            && value.compare(bound) != Some(Ordering::Greater)
        {
            return Err(ValidationError::NotAboveExclusiveMinimum {
                exclusive_minimum: bound.to_string(),
            });
        }
        if let Some(bound) = &c.exclusive_maximum
            && value.compare(bound) != Some(Ordering::Less)
        {
            return Err(ValidationError::NotBelowExclusiveMaximum {
                exclusive_maximum: bound.to_string(),
            });
        }
        Ok(())
    }

    fn check_text(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(text) = value else {
            return Ok(());
        };
        let c = &self.constraints;
        let length = text.chars().count();

        if let Some(minimum_length) = c.minimum_length
            && length < minimum_length
        {
            return Err(ValidationError::TooShort { minimum_length });
        }
        if let Some(maximum_length) = c.maximum_length
            && length > maximum_length
        {
            return Err(ValidationError::TooLong { maximum_length });
        }
        if let Some(pattern) = &c.pattern
            && !pattern.is_match(text)
        {
            return Err(ValidationError::PatternMismatch {
                pattern: pattern.as_str().to_string(),
            });
        }
        Ok(())
    }

    fn check_multiple_of(&self, value: &Value) -> Result<(), ValidationError> {
        match &self.constraints.multiple_of {
            Some(divisor) if value.is_multiple_of(divisor) != Some(true) => {
                Err(ValidationError::NotMultipleOf {
                    multiple_of: divisor.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_enumeration(&self, value: &Value) -> Result<(), ValidationError> {
        let allowed = &self.constraints.enumeration;
        if allowed.is_empty() || allowed.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::NotInEnum)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Bound, ConstraintSpec, Metadata};
    use serde_json::json;

    fn validator(kind: Kind, nullable: bool, spec: ConstraintSpec) -> Validator {
        validator_with_variants(kind, nullable, None, spec)
    }

    fn validator_with_variants(
        kind: Kind,
        nullable: bool,
        variants: Option<&[&str]>,
        spec: ConstraintSpec,
    ) -> Validator {
        let constraints = Constraints::resolve("member", kind, variants, spec).unwrap();
        Validator::new(&MemberDescriptor {
            name: "member".into(),
            rename: None,
            kind,
            nullable,
            read_only: false,
            constraints,
            metadata: Metadata::default(),
        })
    }

    fn level() -> Validator {
        validator(
            Kind::Int32,
            false,
            ConstraintSpec {
                minimum: Some(Bound::from(0)),
                maximum: Some(Bound::from(100)),
                multiple_of: Some(Bound::from(5)),
                ..ConstraintSpec::default()
            },
        )
    }

    #[test]
    fn should_accept_values_at_bounds_and_multiples() {
        let v = level();
        assert_eq!(v.try_accept(&json!(0)), Ok(Value::I32(0)));
        assert_eq!(v.try_accept(&json!(100)), Ok(Value::I32(100)));
        assert_eq!(v.try_accept(&json!(55)), Ok(Value::I32(55)));
    }

    #[test]
    fn should_reject_value_that_is_not_a_multiple() {
        assert_eq!(
            level().try_accept(&json!(53)),
            Err(ValidationError::NotMultipleOf {
                multiple_of: "5".into()
            })
        );
    }

    #[test]
    fn should_reject_value_above_maximum() {
        assert_eq!(
            level().try_accept(&json!(105)),
            Err(ValidationError::AboveMaximum {
                maximum: "100".into()
            })
        );
    }

    #[test]
    fn should_reject_value_below_minimum() {
        assert!(matches!(
            level().try_accept(&json!(-5)),
            Err(ValidationError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn should_reject_null_when_not_nullable() {
        assert_eq!(
            level().try_accept(&json!(null)),
            Err(ValidationError::NullNotAllowed)
        );
    }

    #[test]
    fn should_accept_null_bypassing_constraints_when_nullable() {
        let v = validator(
            Kind::Int32,
            true,
            ConstraintSpec {
                minimum: Some(Bound::from(10)),
                enumeration: vec![json!(10), json!(20)],
                ..ConstraintSpec::default()
            },
        );
        assert_eq!(v.try_accept(&json!(null)), Ok(Value::Null));
    }

    #[test]
    fn should_reject_wrong_wire_kind() {
        assert_eq!(
            level().try_accept(&json!("55")),
            Err(ValidationError::KindMismatch {
                expected: Kind::Int32
            })
        );
    }

    #[test]
    fn should_apply_exclusive_bounds() {
        let v = validator(
            Kind::Float64,
            false,
            ConstraintSpec {
                exclusive_minimum: Some(Bound::from(0.0)),
                exclusive_maximum: Some(Bound::from(1.0)),
                ..ConstraintSpec::default()
            },
        );
        assert_eq!(v.try_accept(&json!(0.5)), Ok(Value::F64(0.5)));
        assert!(matches!(
            v.try_accept(&json!(0.0)),
            Err(ValidationError::NotAboveExclusiveMinimum { .. })
        ));
        assert!(matches!(
            v.try_accept(&json!(1.0)),
            Err(ValidationError::NotBelowExclusiveMaximum { .. })
        ));
    }

    #[test]
    fn should_check_float_multiple_with_remainder() {
        let v = validator(
            Kind::Float64,
            false,
            ConstraintSpec {
                multiple_of: Some(Bound::from(0.5)),
                ..ConstraintSpec::default()
            },
        );
        assert!(v.try_accept(&json!(2.5)).is_ok());
        assert!(v.try_accept(&json!(2.25)).is_err());
    }

    #[test]
    fn should_reject_enum_miss_even_when_in_range() {
        let v = validator(
            Kind::UInt16,
            false,
            ConstraintSpec {
                minimum: Some(Bound::from(0)),
                maximum: Some(Bound::from(10)),
                enumeration: vec![json!(2), json!(4)],
                ..ConstraintSpec::default()
            },
        );
        assert_eq!(v.try_accept(&json!(4)), Ok(Value::U16(4)));
        assert_eq!(v.try_accept(&json!(3)), Err(ValidationError::NotInEnum));
    }

    #[test]
    fn should_check_string_length_and_pattern() {
        let v = validator(
            Kind::String,
            false,
            ConstraintSpec {
                minimum_length: Some(2),
                maximum_length: Some(4),
                pattern: Some("^[a-z]+$".into()),
                ..ConstraintSpec::default()
            },
        );
        assert_eq!(v.try_accept(&json!("abc")), Ok(Value::String("abc".into())));
        assert_eq!(
            v.try_accept(&json!("a")),
            Err(ValidationError::TooShort { minimum_length: 2 })
        );
        assert_eq!(
            v.try_accept(&json!("abcde")),
            Err(ValidationError::TooLong { maximum_length: 4 })
        );
        assert!(matches!(
            v.try_accept(&json!("AB")),
            Err(ValidationError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn should_count_length_in_characters() {
        let v = validator(
            Kind::String,
            false,
            ConstraintSpec {
                maximum_length: Some(2),
                ..ConstraintSpec::default()
            },
        );
        assert!(v.try_accept(&json!("éé")).is_ok());
    }

    #[test]
    fn should_check_char_membership_exactly() {
        let v = validator(
            Kind::Char,
            false,
            ConstraintSpec {
                enumeration: vec![json!("a"), json!("b")],
                ..ConstraintSpec::default()
            },
        );
        assert_eq!(v.try_accept(&json!("a")), Ok(Value::Char('a')));
        assert_eq!(v.try_accept(&json!("c")), Err(ValidationError::NotInEnum));
        assert_eq!(
            v.try_accept(&json!("ab")),
            Err(ValidationError::CharLength { length: 2 })
        );
    }

    #[test]
    fn should_accept_only_declared_enum_variants() {
        let v = validator_with_variants(
            Kind::Enum,
            false,
            Some(&["Eco", "Boost"]),
            ConstraintSpec::default(),
        );
        assert_eq!(v.try_accept(&json!("Eco")), Ok(Value::Enum("Eco".into())));
        assert_eq!(v.try_accept(&json!("eco")), Err(ValidationError::NotInEnum));
    }

    #[test]
    fn should_expose_kind_and_nullability() {
        let v = validator(Kind::Boolean, true, ConstraintSpec::default());
        assert_eq!(v.kind(), Kind::Boolean);
        assert!(v.is_nullable());
    }
}
