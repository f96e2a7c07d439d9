use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },
    #[error("Value {value} out of range for {bits}-bit field")]
    Range { bits: u32, value: u64 },
    #[error("Truncated data: needed {needed} bytes, {available} available")]
    TruncatedData { needed: usize, available: usize },
    #[error("Trailing data: consumed {consumed} of {total} bytes")]
    TrailingData { consumed: usize, total: usize },
    #[error("Invalid type: {0}")]
    InvalidType(String),
}

impl CodecError {
    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::SchemaMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
