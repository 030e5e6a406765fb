//! Validation engine: decoder state, error taxonomy and field-level
//! primitives every payload schema is built from.

pub mod decoder;
pub mod path;
pub mod primitives;
pub mod report;

pub use decoder::{DecodeMode, Decoder, Object};
pub use path::{FieldPath, PathSegment};
pub use primitives::Numeric;
pub use report::{CandidateFailure, Constraint, ErrorKind, JsonType, ValidationError, Violation};

use serde_json::Value;

/// A type that can be decoded from an untyped JSON value with
/// path-qualified violations.
///
/// Implementations return `None` only after recording at least one
/// violation on `d`.
pub trait Schema: Sized {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self>;
}

/// A closed string domain with a fixed wire spelling per variant.
pub trait WireEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [&'static str];

    fn from_wire(s: &str) -> Option<Self>;

    fn as_wire(&self) -> &'static str;
}

/// Declares a closed string enum and derives [`WireEnum`], `Display`,
/// `Serialize` and [`Schema`] for it.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::schema::WireEnum for $name {
            const VARIANTS: &'static [&'static str] = &[$($wire),+];

            fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $( $wire => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn as_wire(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::schema::WireEnum::as_wire(self))
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, s: S) -> ::std::result::Result<S::Ok, S::Error> {
                s.serialize_str($crate::schema::WireEnum::as_wire(self))
            }
        }

        impl $crate::schema::Schema for $name {
            fn decode(
                d: &mut $crate::schema::Decoder,
                value: &::serde_json::Value,
            ) -> Option<Self> {
                d.wire_enum(value)
            }
        }
    };
}
pub(crate) use wire_enum;

impl Schema for String {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.string(value)
    }
}

impl Schema for bool {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.boolean(value)
    }
}

impl Schema for i64 {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.integer(value)
    }
}

impl Schema for f64 {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.number(value)
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.array(value, |d, item| T::decode(d, item))
    }
}

/// Serialize `{ "type": tag, key: content }`, the shape every
/// type-discriminated payload uses on the wire.
pub(crate) fn serialize_tagged<S, T>(
    s: S,
    tag: &str,
    content: Option<(&str, &T)>,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: serde::Serialize + ?Sized,
{
    use serde::ser::SerializeMap;
    let mut map = s.serialize_map(None)?;
    map.serialize_entry("type", tag)?;
    if let Some((key, value)) = content {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Decode an already-parsed JSON value as `T`.
pub fn decode_value<T: Schema>(value: &Value, mode: DecodeMode) -> Result<T, ValidationError> {
    let mut d = Decoder::new(mode);
    let out = T::decode(&mut d, value);
    d.finish(out)
}

/// Parse `bytes` as JSON and decode the result as `T`.
pub fn decode_slice<T: Schema>(bytes: &[u8], mode: DecodeMode) -> Result<T, ValidationError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        ValidationError::single(
            FieldPath::root(),
            ErrorKind::InvalidJson {
                message: e.to_string(),
            },
        )
    })?;
    decode_value(&value, mode)
}
