//! Oracle Crypto
//!
//! Pure cryptographic primitives for oracle request clients: ed25519 signing
//! identities, checksummed ledger addresses and the SHA-512/256 digest the
//! ledger uses for addressing.

pub mod address;
pub mod keys;
pub mod sign;

pub use address::{Address, KeyError, ADDRESS_LEN, CHECKSUM_LEN};
pub use keys::{hash, SigningKeypair, DIGEST_LEN};
pub use sign::{sign_data, verify_signature, SIGNATURE_LEN};
