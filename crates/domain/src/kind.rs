//! Primitive kinds a Thing member may carry.

use std::fmt;

/// The closed set of primitive kinds. Exactly one per member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Char,
    String,
    Uuid,
    /// Date-time without offset.
    DateTime,
    /// Date-time with offset.
    DateTimeOffset,
    Duration,
    /// Enumeration exposed as its variant names.
    Enum,
}

impl Kind {
    /// The JSON-schema `type` keyword for this kind.
    #[must_use]
    pub fn json_type(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int8
            | Self::Int16
            | Self::Int32
            | Self::Int64
            | Self::UInt8
            | Self::UInt16
            | Self::UInt32
            | Self::UInt64 => "integer",
            Self::Float32 | Self::Float64 | Self::Decimal => "number",
            Self::Char
            | Self::String
            | Self::Uuid
            | Self::DateTime
            | Self::DateTimeOffset
            | Self::Duration
            | Self::Enum => "string",
        }
    }

    /// Whether range and `multipleOf` constraints apply.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self.json_type(), "integer" | "number")
    }

    /// Whether length and pattern constraints apply.
    #[must_use]
    pub fn is_string(self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::Uuid => "uuid",
            Self::DateTime => "date-time",
            Self::DateTimeOffset => "date-time-offset",
            Self::Duration => "duration",
            Self::Enum => "enum",
        })
    }
}
