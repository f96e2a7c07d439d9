//! Box (per-request storage) name derivation.
//!
//! These mirror the contract's box keys so the client can declare the storage a
//! request touches before submitting it.
//!
//! `box_name = SHA-512/256(owner_public_key ++ key)`

use oracle_codec::Value;
use oracle_crypto::{hash, Address, KeyError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Derive the box name keyed by `owner` and a request-scoped `key`.
///
/// `key` may be empty. Reusing a key for two outstanding requests from the same
/// owner addresses the same box.
pub fn derive_box_name(owner: &Address, key: &[u8]) -> [u8; 32] {
    let mut seed = Vec::with_capacity(owner.public_key().len() + key.len());
    seed.extend_from_slice(owner.public_key());
    seed.extend_from_slice(key);
    let out = hash(&seed);
    debug!(owner = %owner, key = %hex::encode(key), box_name = %hex::encode(out), "derived box name");
    out
}

/// Derive a box name from a textual address.
pub fn derive_box_name_for(identity: &str, key: &[u8]) -> Result<[u8; 32], KeyError> {
    let owner: Address = identity.parse()?;
    Ok(derive_box_name(&owner, key))
}

/// A box the call needs access to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxReference {
    pub app_id: u64,
    pub name: Vec<u8>,
}

impl BoxReference {
    pub fn new(app_id: u64, name: impl Into<Vec<u8>>) -> Self {
        Self {
            app_id,
            name: name.into(),
        }
    }

    /// Reference to the box keyed by `owner` and `key` in `app_id`.
    pub fn keyed(app_id: u64, owner: &Address, key: &[u8]) -> Self {
        Self::new(app_id, derive_box_name(owner, key))
    }

    /// `(uint64 app_id, byte[] name)`
    pub fn to_value(&self) -> Value {
        Value::Tuple(vec![self.app_id.into(), self.name.as_slice().into()])
    }
}
