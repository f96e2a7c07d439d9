//! Dynamically shaped values checked against a [`Schema`](crate::Schema) at encode time.

use std::fmt;

use crate::error::{CodecError, Result};
use crate::schema::UintWidth;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Uint(u64),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Unwrap an integer, checking it fits `width`.
    pub fn into_uint(self, width: UintWidth) -> Result<u64> {
        match self {
            Self::Uint(value) if value <= width.max_value() => Ok(value),
            Self::Uint(value) => Err(CodecError::Range {
                bits: width.bits(),
                value,
            }),
            other => Err(CodecError::mismatch(format!("uint{}", width.bits()), other)),
        }
    }

    pub fn into_u32(self) -> Result<u32> {
        let value = self.into_uint(UintWidth::U32)?;
        u32::try_from(value).map_err(|_| CodecError::Range { bits: 32, value })
    }

    pub fn into_u64(self) -> Result<u64> {
        self.into_uint(UintWidth::U64)
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            other => Err(CodecError::mismatch("byte[]", other)),
        }
    }

    pub fn into_array(self) -> Result<Vec<Value>> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(CodecError::mismatch("array", other)),
        }
    }

    /// Unwrap a tuple of exactly `N` fields.
    ///
    /// ```
    /// use oracle_codec::Value;
    ///
    /// let [id, data] = Value::Tuple(vec![7u64.into(), b"x".to_vec().into()])
    ///     .into_tuple::<2>()
    ///     .unwrap();
    /// assert_eq!(id, Value::Uint(7));
    /// assert_eq!(data, Value::Bytes(b"x".to_vec()));
    /// ```
    pub fn into_tuple<const N: usize>(self) -> Result<[Value; N]> {
        match self {
            Self::Tuple(fields) => <[Value; N]>::try_from(fields).map_err(|fields| {
                CodecError::mismatch(
                    format!("tuple of {N}"),
                    format!("tuple of {}", fields.len()),
                )
            }),
            other => Err(CodecError::mismatch(format!("tuple of {N}"), other)),
        }
    }
}

/// Short description of the value's shape, used in mismatch errors.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "uint {value}"),
            Self::Bytes(bytes) => write!(f, "{} bytes", bytes.len()),
            Self::Array(items) => write!(f, "array of {}", items.len()),
            Self::Tuple(fields) => write!(f, "tuple of {}", fields.len()),
        }
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Uint(value.into())
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Self::Uint(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Uint(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}
