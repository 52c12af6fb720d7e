//! Key test helpers and utilities
//!
//! Standardized helpers for creating signing keys and the addresses they
//! control across the Mandate test suite.

use ed25519_dalek::{SigningKey, VerifyingKey};
use mandate_core::{ed25519_sign, ed25519_verify, hash, Address, Ed25519Signature};
use mandate_delegation::{Delegation, DelegationBuilder, SigningDomain};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

/// Key test fixture for consistent test key generation
#[derive(Debug, Clone)]
pub struct KeyTestFixture {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: Address,
}

impl KeyTestFixture {
    /// Create a new key fixture with deterministic generation from a seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Create a key fixture from a seed string
    pub fn from_seed_string(seed: &str) -> Self {
        Self::from_seed(&hash::hash_tagged("mandate.testkit.key", seed.as_bytes()))
    }

    /// Create a key from a seeded ChaCha stream
    pub fn from_rng_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self::from_signing_key(SigningKey::generate(&mut rng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            address: Address::from_verifying_key(&verifying_key),
            signing_key,
            verifying_key,
        }
    }

    /// Get the signing key
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Get the verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Address controlled by this key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Public key bytes, as used in smart-account blueprints
    pub fn public_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Sign a message with this key
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        ed25519_sign(&self.signing_key, message)
    }

    /// Verify a signature with this key's verifying key
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        ed25519_verify(&self.verifying_key, message, signature).is_ok()
    }

    /// Finish and sign a delegation
    pub fn sign_delegation(&self, builder: DelegationBuilder, domain: &SigningDomain) -> Delegation {
        builder.build().sign_with(&self.signing_key, domain)
    }
}

/// Builder for creating multiple test keys with consistent seeding
#[derive(Debug)]
pub struct KeySetBuilder {
    count: usize,
    base_seed: Option<String>,
}

impl KeySetBuilder {
    /// Create a new key set builder
    pub fn new(count: usize) -> Self {
        Self {
            count,
            base_seed: None,
        }
    }

    /// Set a base seed for deterministic key generation
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.base_seed = Some(seed.into());
        self
    }

    /// Build the set of keys
    pub fn build(self) -> Vec<KeyTestFixture> {
        let base = self.base_seed.as_deref().unwrap_or("key-seed");
        (0..self.count)
            .map(|i| KeyTestFixture::from_seed_string(&format!("{base}-{i}")))
            .collect()
    }
}
