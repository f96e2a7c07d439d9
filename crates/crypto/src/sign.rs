//! Ed25519 signatures over operation payloads.

use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};

use crate::address::Address;
use crate::keys::SigningKeypair;

/// Length of an ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// Sign `payload` as the keypair's account.
pub fn sign_data(keypair: &SigningKeypair, payload: &[u8]) -> [u8; SIGNATURE_LEN] {
    keypair.signing_key.sign(payload).to_bytes()
}

/// Whether `signature` over `payload` was produced by the account behind `signer`.
///
/// An address whose key is not a valid curve point never verifies.
pub fn verify_signature(signer: &Address, payload: &[u8], signature: &[u8; SIGNATURE_LEN]) -> bool {
    VerifyingKey::from_bytes(signer.public_key())
        .map(|key| key.verify(payload, &Signature::from_bytes(signature)).is_ok())
        .unwrap_or(false)
}
