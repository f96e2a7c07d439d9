//! Recursive encode/decode over the schema algebra.

use crate::error::{CodecError, Result};
use crate::schema::Schema;
use crate::value::Value;

/// Width of the big-endian length prefix on byte sequences and dynamic arrays.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Encode `value` against `schema`.
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(schema.min_encoded_len());
    encode_into(schema, value, &mut out)?;
    Ok(out)
}

/// Append the encoding of `value` to `out`.
///
/// On error `out` may hold a partial encoding.
pub fn encode_into(schema: &Schema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (schema, value) {
        (Schema::Uint(width), Value::Uint(v)) => {
            if *v > width.max_value() {
                return Err(CodecError::Range {
                    bits: width.bits(),
                    value: *v,
                });
            }
            let bytes = v.to_be_bytes();
            out.extend_from_slice(&bytes[bytes.len() - width.byte_len()..]);
        }
        (Schema::Bytes, Value::Bytes(bytes)) => {
            write_len(bytes.len(), out)?;
            out.extend_from_slice(bytes);
        }
        (Schema::Array(element), Value::Array(items)) => {
            check_element_width(schema, element, items.len())?;
            write_len(items.len(), out)?;
            for item in items {
                encode_into(element, item, out)?;
            }
        }
        (Schema::Tuple(fields), Value::Tuple(values)) if fields.len() == values.len() => {
            for (field, value) in fields.iter().zip(values) {
                encode_into(field, value, out)?;
            }
        }
        _ => return Err(CodecError::mismatch(schema, value)),
    }
    Ok(())
}

/// Exact encoded size of `value`, validating it against `schema` without allocating.
pub fn encoded_len(schema: &Schema, value: &Value) -> Result<usize> {
    match (schema, value) {
        (Schema::Uint(width), Value::Uint(v)) => {
            if *v > width.max_value() {
                return Err(CodecError::Range {
                    bits: width.bits(),
                    value: *v,
                });
            }
            Ok(width.byte_len())
        }
        (Schema::Bytes, Value::Bytes(bytes)) => Ok(LENGTH_PREFIX_LEN + bytes.len()),
        (Schema::Array(element), Value::Array(items)) => {
            check_element_width(schema, element, items.len())?;
            items.iter().try_fold(LENGTH_PREFIX_LEN, |acc, item| {
                encoded_len(element, item).map(|len| acc + len)
            })
        }
        (Schema::Tuple(fields), Value::Tuple(values)) if fields.len() == values.len() => fields
            .iter()
            .zip(values)
            .try_fold(0, |acc, (field, value)| {
                encoded_len(field, value).map(|len| acc + len)
            }),
        _ => Err(CodecError::mismatch(schema, value)),
    }
}

/// Arrays whose elements encode to zero bytes may only be empty.
fn check_element_width(schema: &Schema, element: &Schema, count: usize) -> Result<()> {
    if count > 0 && element.min_encoded_len() == 0 {
        return Err(CodecError::InvalidType(format!(
            "{schema}: array elements must not be zero-width"
        )));
    }
    Ok(())
}

fn write_len(len: usize, out: &mut Vec<u8>) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| CodecError::Range {
        bits: 32,
        value: len as u64,
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

/// Decode a complete value; bytes left over after it are an error.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Value> {
    let (value, consumed) = decode_prefix(schema, bytes)?;
    if consumed != bytes.len() {
        return Err(CodecError::TrailingData {
            consumed,
            total: bytes.len(),
        });
    }
    Ok(value)
}

/// Decode one value from the front of `bytes`, returning it with the number of bytes consumed.
pub fn decode_prefix(schema: &Schema, bytes: &[u8]) -> Result<(Value, usize)> {
    let mut reader = Reader { data: bytes, pos: 0 };
    let value = reader.read_value(schema)?;
    Ok((value, reader.pos))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(CodecError::TruncatedData {
                needed: n,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_len(&mut self) -> Result<usize> {
        let mut buf = [0u8; LENGTH_PREFIX_LEN];
        buf.copy_from_slice(self.take(LENGTH_PREFIX_LEN)?);
        Ok(u32::from_be_bytes(buf) as usize)
    }

    fn read_value(&mut self, schema: &Schema) -> Result<Value> {
        match schema {
            Schema::Uint(width) => {
                let bytes = self.take(width.byte_len())?;
                let value = bytes
                    .iter()
                    .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
                Ok(Value::Uint(value))
            }
            Schema::Bytes => {
                let len = self.read_len()?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            Schema::Array(element) => {
                let count = self.read_len()?;
                check_element_width(schema, element, count)?;
                // Reject impossible counts before allocating.
                let needed = count.saturating_mul(element.min_encoded_len());
                let available = self.remaining();
                if needed > available {
                    return Err(CodecError::TruncatedData { needed, available });
                }
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.read_value(element)?);
                }
                Ok(Value::Array(items))
            }
            Schema::Tuple(fields) => fields
                .iter()
                .map(|field| self.read_value(field))
                .collect::<Result<Vec<_>>>()
                .map(Value::Tuple),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UintWidth;

    fn source_spec_schema() -> Schema {
        Schema::tuple([
            Schema::Uint(UintWidth::U32),
            Schema::array(Schema::Bytes),
            Schema::Uint(UintWidth::U64),
        ])
    }

    fn source_spec_value() -> Value {
        Value::Tuple(vec![
            Value::Uint(11),
            Value::Array(vec![b"Kenya".as_slice().into(), b"nairobi".as_slice().into()]),
            Value::Uint(60),
        ])
    }

    #[test]
    fn test_uint_layout_big_endian() {
        let encoded = encode(&Schema::Uint(UintWidth::U32), &Value::Uint(0x0102_0304)).unwrap();
        assert_eq!(encoded, vec![1, 2, 3, 4]);
        let encoded = encode(&Schema::Uint(UintWidth::U16), &Value::Uint(0x0a0b)).unwrap();
        assert_eq!(encoded, vec![0x0a, 0x0b]);
    }

    #[test]
    fn test_bytes_layout() {
        let encoded = encode(&Schema::Bytes, &Value::Bytes(b"test".to_vec())).unwrap();
        assert_eq!(encoded, vec![0, 0, 0, 4, b't', b'e', b's', b't']);
    }

    #[test]
    fn test_source_spec_layout() {
        let encoded = encode(&source_spec_schema(), &source_spec_value()).unwrap();
        let mut expected = vec![0, 0, 0, 11, 0, 0, 0, 2];
        expected.extend_from_slice(&[0, 0, 0, 5]);
        expected.extend_from_slice(b"Kenya");
        expected.extend_from_slice(&[0, 0, 0, 7]);
        expected.extend_from_slice(b"nairobi");
        expected.extend_from_slice(&60u64.to_be_bytes());
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_roundtrip_nested() {
        let schema = Schema::tuple([
            Schema::array(source_spec_schema()),
            Schema::array(Schema::array(Schema::Bytes)),
            Schema::Uint(UintWidth::U8),
        ]);
        let value = Value::Tuple(vec![
            Value::Array(vec![source_spec_value(), source_spec_value()]),
            Value::Array(vec![
                Value::Array(vec![]),
                Value::Array(vec![Value::Bytes(vec![]), Value::Bytes(vec![0xff; 3])]),
            ]),
            Value::Uint(255),
        ]);
        let encoded = encode(&schema, &value).unwrap();
        assert_eq!(encoded.len(), encoded_len(&schema, &value).unwrap());
        assert_eq!(decode(&schema, &encoded).unwrap(), value);
    }

    #[test]
    fn test_deterministic() {
        let a = encode(&source_spec_schema(), &source_spec_value()).unwrap();
        let b = encode(&source_spec_schema(), &source_spec_value()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_range_enforced() {
        let schema = Schema::Uint(UintWidth::U8);
        assert_eq!(encode(&schema, &Value::Uint(255)).unwrap(), vec![255]);
        assert_eq!(
            encode(&schema, &Value::Uint(256)),
            Err(CodecError::Range { bits: 8, value: 256 })
        );
        assert_eq!(
            encoded_len(&schema, &Value::Uint(256)),
            Err(CodecError::Range { bits: 8, value: 256 })
        );
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        let value = Value::Tuple(vec![Value::Uint(11), Value::Array(vec![])]);
        assert!(matches!(
            encode(&source_spec_schema(), &value),
            Err(CodecError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_array_where_bytes_expected() {
        let value = Value::Array(vec![Value::Uint(1)]);
        let err = encode(&Schema::Bytes, &value).unwrap_err();
        assert_eq!(
            err,
            CodecError::SchemaMismatch {
                expected: "byte[]".into(),
                found: "array of 1".into(),
            }
        );
    }

    #[test]
    fn test_every_prefix_truncated() {
        let encoded = encode(&source_spec_schema(), &source_spec_value()).unwrap();
        for cut in 0..encoded.len() {
            assert!(
                matches!(
                    decode(&source_spec_schema(), &encoded[..cut]),
                    Err(CodecError::TruncatedData { .. })
                ),
                "prefix of {cut} bytes should be truncated"
            );
        }
    }

    #[test]
    fn test_trailing_data() {
        let mut encoded = encode(&source_spec_schema(), &source_spec_value()).unwrap();
        let len = encoded.len();
        encoded.push(0);
        assert_eq!(
            decode(&source_spec_schema(), &encoded),
            Err(CodecError::TrailingData {
                consumed: len,
                total: len + 1
            })
        );

        let (value, consumed) = decode_prefix(&source_spec_schema(), &encoded).unwrap();
        assert_eq!(value, source_spec_value());
        assert_eq!(consumed, len);
    }

    #[test]
    fn test_oversized_count_rejected_early() {
        let schema = Schema::array(Schema::Uint(UintWidth::U64));
        let data = [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(
            decode(&schema, &data),
            Err(CodecError::TruncatedData {
                needed: 0xffff_ffff * 8,
                available: 8
            })
        );
    }

    #[test]
    fn test_zero_width_elements_rejected() {
        let schema = Schema::array(Schema::Tuple(vec![]));
        let err = decode(&schema, &[0, 0x4c, 0x4b, 0x40]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidType(_)));

        let value = Value::Array(vec![Value::Tuple(vec![])]);
        assert!(matches!(encode(&schema, &value), Err(CodecError::InvalidType(_))));
        assert!(matches!(encoded_len(&schema, &value), Err(CodecError::InvalidType(_))));

        let empty = encode(&schema, &Value::Array(vec![])).unwrap();
        assert_eq!(empty, vec![0, 0, 0, 0]);
        assert_eq!(decode(&schema, &empty).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_empty_tuple() {
        let schema = Schema::Tuple(vec![]);
        let encoded = encode(&schema, &Value::Tuple(vec![])).unwrap();
        assert!(encoded.is_empty());
        assert_eq!(decode(&schema, &encoded).unwrap(), Value::Tuple(vec![]));
    }
}
