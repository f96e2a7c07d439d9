//! Request payload types and their wire mapping.

use oracle_codec::{Result, Schema, TypedValue, Value};

use crate::registry::SchemaRegistry;

/// One data-source directive.
///
/// `args` are positional parameters for the source (feed keys, JSON paths, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub source_id: u32,
    pub args: Vec<Vec<u8>>,
    pub max_age_seconds: u64,
}

impl SourceSpec {
    pub fn new<A: Into<Vec<u8>>>(
        source_id: u32,
        args: impl IntoIterator<Item = A>,
        max_age_seconds: u64,
    ) -> Self {
        Self {
            source_id,
            args: args.into_iter().map(Into::into).collect(),
            max_age_seconds,
        }
    }
}

impl TypedValue for SourceSpec {
    fn schema() -> Schema {
        SchemaRegistry::source_spec()
    }

    fn to_value(&self) -> Value {
        Value::Tuple(vec![
            self.source_id.into(),
            Value::Array(self.args.iter().map(|arg| arg.as_slice().into()).collect()),
            self.max_age_seconds.into(),
        ])
    }

    fn from_value(value: Value) -> Result<Self> {
        let [source_id, args, max_age_seconds] = value.into_tuple()?;
        Ok(Self {
            source_id: source_id.into_u32()?,
            args: args
                .into_array()?
                .into_iter()
                .map(Value::into_bytes)
                .collect::<Result<_>>()?,
            max_age_seconds: max_age_seconds.into_u64()?,
        })
    }
}

/// The request body: sources, how to aggregate them, and opaque caller data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    pub sources: Vec<SourceSpec>,
    pub aggregation_type: u32,
    /// Returned verbatim with the response; never inspected.
    pub user_data: Vec<u8>,
}

impl RequestArgs {
    pub fn new(sources: Vec<SourceSpec>, aggregation_type: u32, user_data: impl Into<Vec<u8>>) -> Self {
        Self {
            sources,
            aggregation_type,
            user_data: user_data.into(),
        }
    }
}

impl TypedValue for RequestArgs {
    fn schema() -> Schema {
        SchemaRegistry::request_args()
    }

    fn to_value(&self) -> Value {
        Value::Tuple(vec![
            Value::Array(self.sources.iter().map(SourceSpec::to_value).collect()),
            self.aggregation_type.into(),
            self.user_data.as_slice().into(),
        ])
    }

    fn from_value(value: Value) -> Result<Self> {
        let [sources, aggregation_type, user_data] = value.into_tuple()?;
        Ok(Self {
            sources: sources
                .into_array()?
                .into_iter()
                .map(SourceSpec::from_value)
                .collect::<Result<_>>()?,
            aggregation_type: aggregation_type.into_u32()?,
            user_data: user_data.into_bytes()?,
        })
    }
}

/// Where the response is delivered: an application and the method to call on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub app_id: u64,
    pub method_selector: Vec<u8>,
}

impl Destination {
    pub fn new(app_id: u64, method_selector: impl Into<Vec<u8>>) -> Self {
        Self {
            app_id,
            method_selector: method_selector.into(),
        }
    }
}

impl TypedValue for Destination {
    fn schema() -> Schema {
        SchemaRegistry::destination()
    }

    fn to_value(&self) -> Value {
        Value::Tuple(vec![
            self.app_id.into(),
            self.method_selector.as_slice().into(),
        ])
    }

    fn from_value(value: Value) -> Result<Self> {
        let [app_id, method_selector] = value.into_tuple()?;
        Ok(Self {
            app_id: app_id.into_u64()?,
            method_selector: method_selector.into_bytes()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_codec::CodecError;

    fn weather_source() -> SourceSpec {
        SourceSpec::new(11, [b"Kenya".as_slice(), b"nairobi".as_slice()], 60)
    }

    #[test]
    fn test_request_args_length() {
        let args = RequestArgs::new(vec![weather_source()], 0, b"test".as_slice());
        let encoded = args.encode().unwrap();
        let expected = 4 + 4 + (4 + 5) + (4 + 7) + 8 + 4 + 4 + (4 + 4);
        assert_eq!(encoded.len(), expected);
        assert_eq!(encoded.len(), 52);
        assert_eq!(RequestArgs::decode(&encoded).unwrap(), args);
    }

    #[test]
    fn test_request_args_prefix_layout() {
        let args = RequestArgs::new(vec![weather_source()], 0, b"test".as_slice());
        let encoded = args.encode().unwrap();
        // Outer source count, then the first source id.
        assert_eq!(&encoded[..8], &[0, 0, 0, 1, 0, 0, 0, 11]);
        assert_eq!(&encoded[encoded.len() - 8..], &[0, 0, 0, 4, b't', b'e', b's', b't']);
    }

    #[test]
    fn test_source_spec_roundtrip_many_args() {
        let source = SourceSpec::new(
            11,
            [
                "005CbGKDn22fNWfXuWQu",
                "Kenya",
                "nairobi",
                "metric",
                "$.data.temparature",
                "$.data.timestamp",
            ],
            60,
        );
        let encoded = source.encode().unwrap();
        assert_eq!(SourceSpec::decode(&encoded).unwrap(), source);
    }

    #[test]
    fn test_destination_roundtrip() {
        let destination = Destination::new(162365438, b"test_endpoint".as_slice());
        let encoded = destination.encode().unwrap();
        assert_eq!(encoded.len(), 8 + 4 + 13);
        assert_eq!(&encoded[..8], &162365438u64.to_be_bytes());
        assert_eq!(Destination::decode(&encoded).unwrap(), destination);
    }

    #[test]
    fn test_empty_user_data_and_args() {
        let args = RequestArgs::new(vec![SourceSpec::new::<Vec<u8>>(1, [], 0)], 3, Vec::<u8>::new());
        let encoded = args.encode().unwrap();
        assert_eq!(RequestArgs::decode(&encoded).unwrap(), args);
    }

    #[test]
    fn test_truncated_request_args() {
        let args = RequestArgs::new(vec![weather_source()], 0, b"test".as_slice());
        let encoded = args.encode().unwrap();
        assert!(matches!(
            RequestArgs::decode(&encoded[..encoded.len() - 1]),
            Err(CodecError::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_source_id_out_of_range() {
        let value = Value::Tuple(vec![
            Value::Uint(u64::from(u32::MAX) + 1),
            Value::Array(vec![]),
            Value::Uint(0),
        ]);
        assert!(matches!(
            SourceSpec::from_value(value),
            Err(CodecError::Range { bits: 32, .. })
        ));
    }
}
