//! Kind check and coercion of wire JSON into a typed [`Value`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Number, Value as Json};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::kind::Kind;
use crate::value::{DATE_TIME_FORMAT, Value, parse_duration};

/// Check that `wire` has the JSON shape of `kind` and convert it.
///
/// `null` is not handled here; callers apply the nullability rule first.
///
/// # Errors
///
/// [`ValidationError::KindMismatch`] when the JSON type is wrong,
/// [`ValidationError::Unparsable`] when the shape is right but the content
/// does not fit the kind (overflow, bad text format), and
/// [`ValidationError::CharLength`] for a char given as a longer string.
pub fn coerce(kind: Kind, wire: &Json) -> Result<Value, ValidationError> {
    let mismatch = ValidationError::KindMismatch { expected: kind };
    let unparsable = ValidationError::Unparsable { expected: kind };

    match kind {
        Kind::Boolean => wire.as_bool().map(Value::Bool).ok_or(mismatch),
        Kind::Int8 => signed(wire, kind).and_then(|v| fit(v, kind)).map(Value::I8),
        Kind::Int16 => signed(wire, kind).and_then(|v| fit(v, kind)).map(Value::I16),
        Kind::Int32 => signed(wire, kind).and_then(|v| fit(v, kind)).map(Value::I32),
        Kind::Int64 => signed(wire, kind).map(Value::I64),
        Kind::UInt8 => unsigned(wire, kind).and_then(|v| fit(v, kind)).map(Value::U8),
        Kind::UInt16 => unsigned(wire, kind).and_then(|v| fit(v, kind)).map(Value::U16),
        Kind::UInt32 => unsigned(wire, kind).and_then(|v| fit(v, kind)).map(Value::U32),
        Kind::UInt64 => unsigned(wire, kind).map(Value::U64),
        Kind::Float32 => {
            let wide = number(wire, kind)?.as_f64().ok_or(unparsable.clone())?;
            #[allow(clippy::cast_possible_truncation)]
            let narrow = wide as f32;
            if narrow.is_finite() {
                Ok(Value::F32(narrow))
            } else {
                Err(unparsable)
            }
        }
        Kind::Float64 => number(wire, kind)?
            .as_f64()
            .map(Value::F64)
            .ok_or(unparsable),
        Kind::Decimal => {
            let text = number(wire, kind)?.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map(Value::Decimal)
                .map_err(|_| unparsable)
        }
        Kind::Char => {
            let text = wire.as_str().ok_or(mismatch)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(ValidationError::CharLength {
                    length: text.chars().count(),
                }),
            }
        }
        Kind::String => wire
            .as_str()
            .map(|text| Value::String(text.to_string()))
            .ok_or(mismatch),
        Kind::Uuid => {
            let text = wire.as_str().ok_or(mismatch)?;
            Uuid::parse_str(text).map(Value::Uuid).map_err(|_| unparsable)
        }
        Kind::DateTime => {
            let text = wire.as_str().ok_or(mismatch)?;
            let text = text.strip_suffix('Z').unwrap_or(text);
            NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
                .map(Value::DateTime)
                .map_err(|_| unparsable)
        }
        Kind::DateTimeOffset => {
            let text = wire.as_str().ok_or(mismatch)?;
            DateTime::parse_from_rfc3339(text)
                .map(Value::DateTimeOffset)
                .map_err(|_| unparsable)
        }
        Kind::Duration => {
            let text = wire.as_str().ok_or(mismatch)?;
            parse_duration(text).map(Value::Duration).ok_or(unparsable)
        }
        Kind::Enum => wire
            .as_str()
            .map(|text| Value::Enum(text.to_string()))
            .ok_or(mismatch),
    }
}

fn number(wire: &Json, kind: Kind) -> Result<&Number, ValidationError> {
    match wire {
        Json::Number(number) => Ok(number),
        _ => Err(ValidationError::KindMismatch { expected: kind }),
    }
}

fn signed(wire: &Json, kind: Kind) -> Result<i64, ValidationError> {
    number(wire, kind)?
        .as_i64()
        .ok_or(ValidationError::Unparsable { expected: kind })
}

fn unsigned(wire: &Json, kind: Kind) -> Result<u64, ValidationError> {
    number(wire, kind)?
        .as_u64()
        .ok_or(ValidationError::Unparsable { expected: kind })
}

fn fit<F, T: TryFrom<F>>(value: F, kind: Kind) -> Result<T, ValidationError> {
    T::try_from(value).map_err(|_| ValidationError::Unparsable { expected: kind })
}
