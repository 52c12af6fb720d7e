//! Deterministic deployment
//!
//! An account's address is fixed before it exists:
//! `last20(hash(0xff || factory || salt || hash(init_code)))`. Deploying the
//! same init code at the same salt always lands at that address, and a second
//! deployment is a no-op rather than an overwrite.

use crate::counter::Counter;
use crate::errors::{AccountError, DeployError};
use crate::keys::AccountKeys;
use crate::ledger::AccountCode;
use crate::world::World;
use mandate_core::encoding::{from_canonical_bytes, to_canonical_bytes};
use mandate_core::crypto::ed25519_verifying_key_from_bytes;
use mandate_core::{hash, Address};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What an init code deploys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blueprint {
    /// Smart account controlled by `threshold` of `signers` (Ed25519 public keys)
    SmartAccount {
        /// Signer public keys
        signers: Vec<[u8; 32]>,
        /// Signatures required
        threshold: u16,
    },
    /// Counter contract, optionally with an owner allowed to reset it
    Counter {
        /// Owner address
        owner: Option<Address>,
    },
}

/// Canonical encoding of a `Blueprint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitCode(Vec<u8>);

impl InitCode {
    /// Encode a blueprint
    pub fn new(blueprint: &Blueprint) -> Result<Self, DeployError> {
        Ok(Self(to_canonical_bytes(blueprint)?))
    }

    /// Wrap raw init code without checking it
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode the blueprint
    pub fn blueprint(&self) -> Result<Blueprint, DeployError> {
        Ok(from_canonical_bytes(&self.0)?)
    }

    /// Hash committed to by the deployment address
    pub fn hash(&self) -> [u8; 32] {
        hash::hash(&self.0)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Result of a deployment request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Code was installed at the address
    Deployed(Address),
    /// Code already existed at the address and was left untouched
    AlreadyDeployed(Address),
}

impl DeployOutcome {
    /// Address of the account either way
    pub fn address(&self) -> Address {
        match self {
            Self::Deployed(address) | Self::AlreadyDeployed(address) => *address,
        }
    }
}

/// Deterministic account factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Factory {
    address: Address,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new(Address::well_known("account-factory"))
    }
}

impl Factory {
    /// Factory at `address`
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// This factory's address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Address an init code with `init_code_hash` deploys to at `salt`
    pub fn compute_address(salt: u64, init_code_hash: &[u8; 32], factory: Address) -> Address {
        let mut h = hash::hasher();
        h.update(&[0xff]);
        h.update(factory.as_bytes());
        h.update(&salt.to_be_bytes());
        h.update(init_code_hash);
        Address::from_digest(&h.finalize())
    }

    /// Address `init_code` deploys to at `salt` through this factory
    pub fn address_of(&self, init_code: &InitCode, salt: u64) -> Address {
        Self::compute_address(salt, &init_code.hash(), self.address)
    }

    /// Deploy `init_code` at `salt`. Idempotent: existing code is never replaced.
    pub fn deploy(
        &self,
        world: &mut World,
        init_code: &InitCode,
        salt: u64,
    ) -> Result<DeployOutcome, DeployError> {
        let address = self.address_of(init_code, salt);
        if world.ledger().is_deployed(&address) {
            debug!(%address, salt, "Account already deployed");
            return Ok(DeployOutcome::AlreadyDeployed(address));
        }

        let code = match init_code.blueprint()? {
            Blueprint::SmartAccount { signers, threshold } => {
                if signers.is_empty() {
                    return Err(DeployError::invalid_blueprint("smart account without signers"));
                }
                let keys = signers
                    .iter()
                    .map(ed25519_verifying_key_from_bytes)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| DeployError::invalid_blueprint(err.to_string()))?;
                let keys = AccountKeys::from_signers(keys, threshold)
                    .map_err(|err: AccountError| DeployError::invalid_blueprint(err.to_string()))?;
                world.signers_mut().register(address, keys);
                AccountCode::SmartAccount
            }
            Blueprint::Counter { owner } => AccountCode::Counter(match owner {
                Some(owner) => Counter::owned_by(owner),
                None => Counter::default(),
            }),
        };

        world.ledger_mut().install(address, code);
        info!(%address, factory = %self.address, salt, "Account deployed");
        Ok(DeployOutcome::Deployed(address))
    }

    /// Deploy if needed and return the address
    pub fn ensure_deployed(
        &self,
        world: &mut World,
        init_code: &InitCode,
        salt: u64,
    ) -> Result<Address, DeployError> {
        self.deploy(world, init_code, salt)
            .map(|outcome| outcome.address())
    }
}
