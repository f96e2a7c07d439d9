//! Oracle Codec
//!
//! Canonical binary encoding for nested composite values: fixed-width unsigned
//! integers, length-prefixed byte sequences, dynamic arrays and fixed-arity tuples.
//!
//! Every value is encoded against a declared [`Schema`]. The layout is a wire
//! contract with the remote contract runtime:
//!
//! - `uintN`: big-endian, exactly `N / 8` bytes
//! - `byte[]` and `T[]`: `[len: u32 BE][payload]`
//! - `(A,B,..)`: field encodings concatenated in declared order

pub mod codec;
pub mod error;
pub mod schema;
pub mod typed;
pub mod value;

pub use codec::{decode, decode_prefix, encode, encode_into, encoded_len, LENGTH_PREFIX_LEN};
pub use error::{CodecError, Result};
pub use schema::{Schema, UintWidth};
pub use typed::TypedValue;
pub use value::Value;
