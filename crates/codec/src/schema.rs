//! Declared shapes for encodable values.
//!
//! Schemas render to and parse from ABI-style type strings, e.g.
//! `(uint32,byte[][],uint64)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Bit width of an unsigned integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
}

impl UintWidth {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::U8),
            16 => Some(Self::U16),
            32 => Some(Self::U32),
            64 => Some(Self::U64),
            _ => None,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    /// Number of bytes the integer occupies on the wire.
    pub fn byte_len(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Largest value representable at this width.
    pub fn max_value(&self) -> u64 {
        match self {
            Self::U64 => u64::MAX,
            other => (1u64 << other.bits()) - 1,
        }
    }
}

/// A closed schema algebra.
///
/// `Bytes` is distinct from `Array(Uint(U8))`: the former is an opaque length-prefixed
/// byte string, the latter an array of one-byte integers. Both share the same layout
/// but values must match the declared variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Schema {
    Uint(UintWidth),
    Bytes,
    Array(Box<Schema>),
    Tuple(Vec<Schema>),
}

impl Schema {
    pub fn array(element: Schema) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn tuple(fields: impl IntoIterator<Item = Schema>) -> Self {
        Self::Tuple(fields.into_iter().collect())
    }

    /// Smallest possible encoding for any value of this schema.
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Self::Uint(width) => width.byte_len(),
            Self::Bytes | Self::Array(_) => crate::LENGTH_PREFIX_LEN,
            Self::Tuple(fields) => fields.iter().map(Schema::min_encoded_len).sum(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(width) => write!(f, "uint{}", width.bits()),
            Self::Bytes => f.write_str("byte[]"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Tuple(fields) => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for Schema {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(element) = s.strip_suffix("[]") {
            if element == "byte" {
                return Ok(Self::Bytes);
            }
            return Ok(Self::array(element.parse()?));
        }

        if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            return split_fields(inner)
                .ok_or_else(|| CodecError::InvalidType(s.to_string()))?
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<_>>>()
                .map(Self::Tuple);
        }

        if s == "byte" {
            return Ok(Self::Uint(UintWidth::U8));
        }

        s.strip_prefix("uint")
            .filter(|bits| !bits.is_empty() && bits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|bits| bits.parse().ok())
            .and_then(UintWidth::from_bits)
            .map(Self::Uint)
            .ok_or_else(|| CodecError::InvalidType(s.to_string()))
    }
}

/// Split a tuple body on its top-level commas. `None` on unbalanced parentheses.
fn split_fields(inner: &str) -> Option<Vec<&str>> {
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                fields.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    fields.push(&inner[start..]);
    Some(fields)
}

impl TryFrom<String> for Schema {
    type Error = CodecError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Schema> for String {
    fn from(schema: Schema) -> Self {
        schema.to_string()
    }
}
