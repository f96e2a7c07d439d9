//! Checksummed ledger addresses.
//!
//! Format: `base32(public_key[32] ++ checksum[4])` without padding, where the
//! checksum is the last 4 bytes of `SHA-512/256(public_key)`. Always 58 characters.

use std::fmt;
use std::str::FromStr;

use base32::Alphabet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::hash;

/// Length of an encoded address string.
pub const ADDRESS_LEN: usize = 58;

/// Number of checksum bytes appended to the public key.
pub const CHECKSUM_LEN: usize = 4;

const ALPHABET: Alphabet = Alphabet::RFC4648 { padding: false };

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid identity {identity}: {reason}")]
    InvalidIdentity { identity: String, reason: String },
}

impl KeyError {
    fn invalid(identity: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            identity: identity.to_string(),
            reason: reason.into(),
        }
    }
}

/// A ledger identity: the 32-byte ed25519 public key behind an address string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 32]);

impl Address {
    pub fn from_public_key(public_key: [u8; 32]) -> Self {
        Self(public_key)
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.0
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = hash(&self.0);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        checksum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(32 + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        f.write_str(&base32::encode(ALPHABET, &raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LEN {
            return Err(KeyError::invalid(
                s,
                format!("expected {ADDRESS_LEN} characters, got {}", s.len()),
            ));
        }
        let raw = base32::decode(ALPHABET, s)
            .ok_or_else(|| KeyError::invalid(s, "not valid base32"))?;
        if raw.len() != 32 + CHECKSUM_LEN {
            return Err(KeyError::invalid(
                s,
                format!("expected {} decoded bytes, got {}", 32 + CHECKSUM_LEN, raw.len()),
            ));
        }

        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&raw[..32]);
        let address = Self(public_key);
        if raw[32..] != address.checksum() {
            return Err(KeyError::invalid(s, "checksum mismatch"));
        }
        Ok(address)
    }
}

impl TryFrom<String> for Address {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}
