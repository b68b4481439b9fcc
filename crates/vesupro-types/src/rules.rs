//! Type rule table: how each supported parameter type travels over the wire.
//!
//! Every supported Go parameter type maps to one [`TypeRule`]. The rule
//! fixes which wire token kinds the dispatcher accepts for the parameter,
//! how the token text is converted (if at all), and how the converted value
//! is cast back to the exact declared type at the call site.
//!
//! | Go type                   | Rule                 | Accepted kinds | Conversion            |
//! |---------------------------|----------------------|----------------|-----------------------|
//! | `uint`, `uint8`..`uint64` | `Unsigned { bits }`  | INT            | `ParseUint(s, 10, b)` |
//! | `byte`                    | `Unsigned { 8 }`     | INT            | `ParseUint(s, 10, 8)` |
//! | `int`, `rune`, `int8`..   | `Signed { bits }`    | INT            | `ParseInt(s, 10, b)`  |
//! | `float32`, `float64`      | `Float { bits }`     | FLOAT          | `ParseFloat(s, b)`    |
//! | `complex64`, `complex128` | `Complex { bits }`   | FLOAT          | `ParseFloat(s, 64)`   |
//! | `bool`                    | `Bool`               | TRUE, FALSE    | none                  |
//! | `string`                  | `Str`                | STRING         | none (identity)       |
//! | `*T`                      | `Aggregate`          | unrestricted   | `T.UnmarshalJSON`     |
//!
//! A bit width of `0` means the platform word size, as in `strconv`.
//!
//! Complex parameters only carry their real part: the token is parsed with
//! the float parser and widened with a zero imaginary part. A real
//! `real+imag` parser is not part of the wire contract.

use serde::{Deserialize, Serialize};

use crate::wire::WireKind;

/// Wire contract of one parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TypeRule {
    Unsigned { bits: u8 },
    Signed { bits: u8 },
    Float { bits: u8 },
    Complex { bits: u8 },
    Bool,
    Str,
    /// A struct decoding itself from the raw token payload.
    Aggregate,
}

/// String-to-value conversion applied to a token's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    ParseUint { bits: u8 },
    ParseInt { bits: u8 },
    ParseFloat { bits: u8 },
}

/// Primitive type names with a rule, in table order.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "uint", "uint8", "uint16", "uint32", "uint64", "byte",
    "int", "rune", "int8", "int16", "int32", "int64",
    "float32", "float64", "complex64", "complex128",
    "bool", "string",
];

impl TypeRule {
    /// Look up the rule for a primitive type name.
    ///
    /// Returns `None` for every name outside [`PRIMITIVE_TYPES`]; aggregates
    /// are recognised from the pointer syntax, not by name.
    pub fn resolve(type_name: &str) -> Option<TypeRule> {
        Some(match type_name {
            "uint" => TypeRule::Unsigned { bits: 0 },
            "uint8" | "byte" => TypeRule::Unsigned { bits: 8 },
            "uint16" => TypeRule::Unsigned { bits: 16 },
            "uint32" => TypeRule::Unsigned { bits: 32 },
            "uint64" => TypeRule::Unsigned { bits: 64 },
            "int" | "rune" => TypeRule::Signed { bits: 0 },
            "int8" => TypeRule::Signed { bits: 8 },
            "int16" => TypeRule::Signed { bits: 16 },
            "int32" => TypeRule::Signed { bits: 32 },
            "int64" => TypeRule::Signed { bits: 64 },
            "float32" => TypeRule::Float { bits: 32 },
            "float64" => TypeRule::Float { bits: 64 },
            "complex64" => TypeRule::Complex { bits: 64 },
            "complex128" => TypeRule::Complex { bits: 128 },
            "bool" => TypeRule::Bool,
            "string" => TypeRule::Str,
            _ => return None,
        })
    }

    /// Token kinds a parameter of this rule may be scanned as.
    ///
    /// Empty for [`TypeRule::Aggregate`]: the aggregate validates its own
    /// payload.
    pub fn accepted_kinds(self) -> &'static [WireKind] {
        match self {
            TypeRule::Unsigned { .. } | TypeRule::Signed { .. } => &[WireKind::Integer],
            TypeRule::Float { .. } | TypeRule::Complex { .. } => &[WireKind::Float],
            TypeRule::Bool => &[WireKind::True, WireKind::False],
            TypeRule::Str => &[WireKind::String],
            TypeRule::Aggregate => &[],
        }
    }

    /// The conversion applied to the token text, if any.
    pub fn conversion(self) -> Option<Conversion> {
        match self {
            TypeRule::Unsigned { bits } => Some(Conversion::ParseUint { bits }),
            TypeRule::Signed { bits } => Some(Conversion::ParseInt { bits }),
            TypeRule::Float { bits } => Some(Conversion::ParseFloat { bits }),
            // real part only, always parsed at full precision
            TypeRule::Complex { .. } => Some(Conversion::ParseFloat { bits: 64 }),
            TypeRule::Bool | TypeRule::Str | TypeRule::Aggregate => None,
        }
    }

    pub fn is_aggregate(self) -> bool {
        self == TypeRule::Aggregate
    }
}
