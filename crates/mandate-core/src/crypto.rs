//! Ed25519 signing and verification helpers
//!
//! Single-signer accounts sign delegation payloads directly with these
//! helpers. Threshold schemes collect several of these signatures.

use crate::errors::{MandateError, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// Ed25519 signing key
pub type Ed25519SigningKey = SigningKey;

/// Ed25519 verifying key (public key)
pub type Ed25519VerifyingKey = VerifyingKey;

/// Length of an encoded Ed25519 signature
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// Ed25519 signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519Signature(pub Signature);

impl Ed25519Signature {
    /// Create signature from byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ED25519_SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            MandateError::crypto(format!(
                "Invalid signature length: expected {ED25519_SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(Signature::from_bytes(&raw)))
    }

    /// Create signature from byte array
    pub fn from_bytes(bytes: &[u8; ED25519_SIGNATURE_LEN]) -> Self {
        Self(Signature::from_bytes(bytes))
    }

    /// Get signature as bytes
    pub fn to_bytes(&self) -> [u8; ED25519_SIGNATURE_LEN] {
        self.0.to_bytes()
    }
}

impl From<Signature> for Ed25519Signature {
    fn from(sig: Signature) -> Self {
        Self(sig)
    }
}

/// Generate an Ed25519 signing key from seed bytes
pub fn ed25519_key_from_seed(seed: &[u8; 32]) -> Ed25519SigningKey {
    SigningKey::from_bytes(seed)
}

/// Sign data with Ed25519
pub fn ed25519_sign(signing_key: &Ed25519SigningKey, data: &[u8]) -> Ed25519Signature {
    Ed25519Signature(signing_key.sign(data))
}

/// Verify an Ed25519 signature
pub fn ed25519_verify(
    verifying_key: &Ed25519VerifyingKey,
    data: &[u8],
    signature: &Ed25519Signature,
) -> Result<()> {
    verifying_key
        .verify(data, &signature.0)
        .map_err(|e| MandateError::crypto(format!("Signature verification failed: {e}")))
}

/// Create Ed25519 verifying key from bytes
pub fn ed25519_verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<Ed25519VerifyingKey> {
    VerifyingKey::from_bytes(bytes)
        .map_err(|e| MandateError::crypto(format!("Invalid verifying key: {e}")))
}
