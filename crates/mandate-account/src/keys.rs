//! Key registry: the reference account authorization scheme
//!
//! Every account is controlled either by one Ed25519 key or by an M-of-N set
//! of keys. Threshold signatures are the canonical encoding of
//! `Vec<(signer_index, signature)>`; a signature verifies when at least
//! `threshold` distinct registered signers produced valid signatures over the
//! payload.

use crate::errors::AccountError;
use mandate_core::encoding::{from_canonical_bytes, to_canonical_bytes};
use mandate_core::{
    ed25519_sign, ed25519_verify, Address, Ed25519Signature, Ed25519SigningKey,
    Ed25519VerifyingKey, Result,
};
use mandate_delegation::AccountAuthorization;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// One share of a threshold signature: signer index and signature
pub type SignatureShare = (u16, Ed25519Signature);

/// Keys controlling an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKeys {
    /// A single signer
    Single(Ed25519VerifyingKey),
    /// Any `threshold` of `keys`
    Threshold {
        /// Registered signers, addressed by index
        keys: Vec<Ed25519VerifyingKey>,
        /// Distinct valid signatures required
        threshold: u16,
    },
}

impl AccountKeys {
    /// Build a threshold key set, rejecting thresholds that can never be met
    pub fn threshold(
        keys: Vec<Ed25519VerifyingKey>,
        threshold: u16,
    ) -> std::result::Result<Self, AccountError> {
        if threshold == 0 || usize::from(threshold) > keys.len() {
            return Err(AccountError::InvalidThreshold {
                threshold,
                keys: keys.len(),
            });
        }
        Ok(Self::Threshold { keys, threshold })
    }

    /// Key set for signer keys: a single key with threshold 1 collapses to `Single`
    pub fn from_signers(
        keys: Vec<Ed25519VerifyingKey>,
        threshold: u16,
    ) -> std::result::Result<Self, AccountError> {
        match keys.as_slice() {
            [key] if threshold == 1 => Ok(Self::Single(*key)),
            _ => Self::threshold(keys, threshold),
        }
    }

    /// Returns `true` if `signature` authorizes `payload`
    pub fn verify(&self, signature: &[u8], payload: &[u8]) -> bool {
        match self {
            Self::Single(key) => Ed25519Signature::from_slice(signature)
                .and_then(|signature| ed25519_verify(key, payload, &signature))
                .is_ok(),
            Self::Threshold { keys, threshold } => {
                let Ok(shares) = from_canonical_bytes::<Vec<SignatureShare>>(signature) else {
                    return false;
                };
                let signers: BTreeSet<u16> = shares
                    .iter()
                    .filter(|(index, share)| {
                        keys.get(usize::from(*index))
                            .is_some_and(|key| ed25519_verify(key, payload, share).is_ok())
                    })
                    .map(|(index, _)| *index)
                    .collect();
                debug!(
                    valid_signers = signers.len(),
                    threshold = *threshold,
                    "Threshold signature checked"
                );
                signers.len() >= usize::from(*threshold)
            }
        }
    }

    /// Returns `true` if `caller` is the address of one of these keys
    pub fn controlled_by(&self, caller: &Address) -> bool {
        match self {
            Self::Single(key) => Address::from_verifying_key(key) == *caller,
            Self::Threshold { keys, .. } => keys
                .iter()
                .any(|key| Address::from_verifying_key(key) == *caller),
        }
    }
}

/// Produce a threshold signature from indexed signer keys
pub fn sign_threshold(signers: &[(u16, &Ed25519SigningKey)], payload: &[u8]) -> Result<Vec<u8>> {
    let shares: Vec<SignatureShare> = signers
        .iter()
        .map(|(index, key)| (*index, ed25519_sign(key, payload)))
        .collect();
    to_canonical_bytes(&shares)
}

/// Address-indexed account keys
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    accounts: HashMap<Address, AccountKeys>,
}

impl KeyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the externally owned account controlled by `key`
    pub fn register_key(&mut self, key: Ed25519VerifyingKey) -> Address {
        let address = Address::from_verifying_key(&key);
        self.accounts.insert(address, AccountKeys::Single(key));
        address
    }

    /// Register keys for an account at an arbitrary address
    pub fn register(&mut self, account: Address, keys: AccountKeys) {
        self.accounts.insert(account, keys);
    }

    /// Keys for `account`, if registered
    pub fn keys(&self, account: &Address) -> Option<&AccountKeys> {
        self.accounts.get(account)
    }

    /// Returns `true` if `account` has registered keys
    pub fn contains(&self, account: &Address) -> bool {
        self.accounts.contains_key(account)
    }
}

impl AccountAuthorization for KeyRegistry {
    fn verify(&self, account: &Address, signature: &[u8], payload: &[u8]) -> bool {
        self.accounts
            .get(account)
            .is_some_and(|keys| keys.verify(signature, payload))
    }

    fn acts_for(&self, account: &Address, caller: &Address) -> bool {
        account == caller
            || self
                .accounts
                .get(account)
                .is_some_and(|keys| keys.controlled_by(caller))
    }
}
