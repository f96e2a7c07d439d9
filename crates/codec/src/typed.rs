use crate::codec;
use crate::error::Result;
use crate::schema::Schema;
use crate::value::Value;

/// A domain type with a fixed schema.
///
/// Implementors map themselves to and from [`Value`]; encoding and decoding are
/// provided on top of that mapping.
pub trait TypedValue: Sized {
    fn schema() -> Schema;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;

    fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&Self::schema(), &self.to_value())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_value(codec::decode(&Self::schema(), bytes)?)
    }
}
