//! In-crate fixtures: key-backed accounts, a recording environment and a
//! recording enforcer

#![allow(clippy::unwrap_used)]

use crate::authorization::AccountAuthorization;
use crate::config::SigningDomain;
use crate::delegation::{Delegation, DelegationBuilder};
use crate::enforcers::{CaveatEnforcer, EnforcementContext};
use crate::errors::PolicyViolation;
use crate::redemption::{ExecutionEnvironment, ExecutionRevert};
use crate::state::CaveatState;
use mandate_core::{
    ed25519_key_from_seed, ed25519_verify, Action, Address, Ed25519Signature, Ed25519SigningKey,
    Ed25519VerifyingKey,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Deterministic key and its derived address
pub struct Actor {
    pub key: Ed25519SigningKey,
    pub address: Address,
}

impl Actor {
    pub fn from_seed(seed: u8) -> Self {
        let key = ed25519_key_from_seed(&[seed; 32]);
        let address = Address::from_verifying_key(&key.verifying_key());
        Self { key, address }
    }

    pub fn sign(&self, builder: DelegationBuilder) -> Delegation {
        builder.build().sign_with(&self.key, &SigningDomain::default())
    }
}

/// Single-key accounts
#[derive(Default)]
pub struct KeyBook {
    keys: HashMap<Address, Ed25519VerifyingKey>,
    operators: HashMap<Address, Address>,
}

impl KeyBook {
    pub fn with(mut self, actor: &Actor) -> Self {
        self.keys.insert(actor.address, actor.key.verifying_key());
        self
    }

    /// Let `operator` redeem on behalf of `account`
    pub fn with_operator(mut self, account: Address, operator: Address) -> Self {
        self.operators.insert(account, operator);
        self
    }
}

impl AccountAuthorization for KeyBook {
    fn verify(&self, account: &Address, signature: &[u8], payload: &[u8]) -> bool {
        let Some(key) = self.keys.get(account) else {
            return false;
        };
        Ed25519Signature::from_slice(signature)
            .and_then(|signature| ed25519_verify(key, payload, &signature))
            .is_ok()
    }

    fn acts_for(&self, account: &Address, caller: &Address) -> bool {
        account == caller || self.operators.get(account) == Some(caller)
    }
}

/// Records executed actions; reverts when told to
#[derive(Default)]
pub struct RecordingEnvironment {
    pub executed: Vec<(Address, Action)>,
    pub revert_with: Option<String>,
}

impl RecordingEnvironment {
    pub fn reverting(reason: &str) -> Self {
        Self {
            executed: Vec::new(),
            revert_with: Some(reason.to_string()),
        }
    }
}

impl ExecutionEnvironment for RecordingEnvironment {
    fn execute(&mut self, account: Address, action: &Action) -> Result<Vec<u8>, ExecutionRevert> {
        if let Some(reason) = &self.revert_with {
            return Err(ExecutionRevert::new(reason.clone()));
        }
        self.executed.push((account, action.clone()));
        Ok(account.as_bytes().to_vec())
    }
}

/// Appends its terms to a shared log on every enforce and commit call.
/// Rejects when the terms are `b"reject"`.
#[derive(Debug, Default)]
pub struct RecordingEnforcer {
    pub enforced: Arc<Mutex<Vec<Vec<u8>>>>,
    pub committed: Arc<Mutex<Vec<Vec<u8>>>>,
    pub seen_args: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingEnforcer {
    pub fn address() -> Address {
        Address::well_known("enforcer.recording")
    }
}

impl CaveatEnforcer for RecordingEnforcer {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn enforce(
        &self,
        ctx: &EnforcementContext<'_>,
        _state: &CaveatState,
    ) -> Result<(), PolicyViolation> {
        self.enforced.lock().push(ctx.terms.to_vec());
        self.seen_args.lock().push(ctx.args.to_vec());
        if ctx.terms == b"reject" {
            return Err(PolicyViolation::Custom("rejected by terms".to_string()));
        }
        Ok(())
    }

    fn after_execution(&self, ctx: &EnforcementContext<'_>, _state: &mut CaveatState) {
        self.committed.lock().push(ctx.terms.to_vec());
    }
}
