use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha512_256};

use crate::address::Address;

/// Length of a SHA-512/256 digest.
pub const DIGEST_LEN: usize = 32;

/// SHA-512/256 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha512_256::digest(data));
    out
}

/// An ed25519 keypair able to sign on behalf of its [`Address`].
#[derive(Clone)]
pub struct SigningKeypair {
    pub(crate) signing_key: SigningKey,
}

impl SigningKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Restore a keypair from its 32-byte secret.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The ledger address of this keypair.
    pub fn address(&self) -> Address {
        Address::from_public_key(self.public_key_bytes())
    }
}

impl std::fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
