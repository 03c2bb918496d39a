//! The tagged union carried through getters, setters and action inputs.

mod duration;
mod typed;

pub use duration::{format_duration, parse_duration};
pub use typed::{Shape, ThingValue};

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::kind::Kind;

/// Wire format used for [`Value::DateTime`].
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A typed value of one of the primitive kinds, or `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
    Uuid(Uuid),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Enum(String),
}

macro_rules! same_variant {
    ($lhs:expr, $rhs:expr, |$a:ident, $b:ident| $body:expr, [$($variant:ident),+]) => {
        match ($lhs, $rhs) {
            $((Value::$variant($a), Value::$variant($b)) => Some($body),)+
            _ => None,
        }
    };
}

impl Value {
    /// The kind of this value, `None` for [`Value::Null`].
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => Kind::Boolean,
            Self::I8(_) => Kind::Int8,
            Self::I16(_) => Kind::Int16,
            Self::I32(_) => Kind::Int32,
            Self::I64(_) => Kind::Int64,
            Self::U8(_) => Kind::UInt8,
            Self::U16(_) => Kind::UInt16,
            Self::U32(_) => Kind::UInt32,
            Self::U64(_) => Kind::UInt64,
            Self::F32(_) => Kind::Float32,
            Self::F64(_) => Kind::Float64,
            Self::Decimal(_) => Kind::Decimal,
            Self::Char(_) => Kind::Char,
            Self::String(_) => Kind::String,
            Self::Uuid(_) => Kind::Uuid,
            Self::DateTime(_) => Kind::DateTime,
            Self::DateTimeOffset(_) => Kind::DateTimeOffset,
            Self::Duration(_) => Kind::Duration,
            Self::Enum(_) => Kind::Enum,
        })
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render as wire JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(v) => Json::Bool(*v),
            Self::I8(v) => Json::from(*v),
            Self::I16(v) => Json::from(*v),
            Self::I32(v) => Json::from(*v),
            Self::I64(v) => Json::from(*v),
            Self::U8(v) => Json::from(*v),
            Self::U16(v) => Json::from(*v),
            Self::U32(v) => Json::from(*v),
            Self::U64(v) => Json::from(*v),
            // Go through the shortest decimal text so 0.1f32 stays 0.1.
            Self::F32(v) => number_from_text(&v.to_string()),
            Self::F64(v) => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
            Self::Decimal(v) => number_from_text(&v.normalize().to_string()),
            Self::Char(v) => Json::String(v.to_string()),
            Self::String(v) | Self::Enum(v) => Json::String(v.clone()),
            Self::Uuid(v) => Json::String(v.hyphenated().to_string()),
            Self::DateTime(v) => Json::String(v.format(DATE_TIME_FORMAT).to_string()),
            Self::DateTimeOffset(v) => Json::String(v.to_rfc3339()),
            Self::Duration(v) => Json::String(format_duration(v)),
        }
    }

    /// Order two values of the same variant. `None` across variants or for NaN.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        same_variant!(self, other, |a, b| a.partial_cmp(b), [
            I8, I16, I32, I64, U8, U16, U32, U64, F32, F64, Decimal, Char, String, DateTime,
            DateTimeOffset, Duration
        ])
        .flatten()
    }

    /// `self mod divisor == 0`, computed in the native domain of the variant.
    ///
    /// `None` when the variants differ or are not numeric.
    #[must_use]
    pub fn is_multiple_of(&self, divisor: &Self) -> Option<bool> {
        match (self, divisor) {
            (Self::F32(a), Self::F32(b)) => Some(*b != 0.0 && a % b == 0.0),
            (Self::F64(a), Self::F64(b)) => Some(*b != 0.0 && a % b == 0.0),
            (Self::Decimal(a), Self::Decimal(b)) => {
                Some(a.checked_rem(*b).is_some_and(|rem| rem.is_zero()))
            }
            _ => same_variant!(self, divisor, |a, b| *b != 0 && a.wrapping_rem(*b) == 0, [
                I8, I16, I32, I64, U8, U16, U32, U64
            ]),
        }
    }
}

fn number_from_text(text: &str) -> serde_json::Value {
    text.parse::<serde_json::Number>()
        .map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            serde_json::Value::String(text) => f.write_str(&text),
            other => fmt::Display::fmt(&other, f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
