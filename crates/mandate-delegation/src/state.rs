//! Revocation, single-use and per-caveat bookkeeping
//!
//! Owned by whoever owns the accounts (see `mandate-account`'s world) and
//! passed into redemption explicitly, so every scenario starts from its own
//! state. Enforcers keep no state of their own; anything they count lives
//! in `CaveatState` here.

use crate::errors::ChainFault;
use mandate_core::DelegationHash;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifies one caveat: its delegation and its position in that delegation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaveatKey {
    /// Hash of the delegation carrying the caveat
    pub delegation_hash: DelegationHash,
    /// Position of the caveat within the delegation
    pub caveat_index: usize,
}

impl CaveatKey {
    /// Key for caveat `caveat_index` of `delegation_hash`
    pub fn new(delegation_hash: DelegationHash, caveat_index: usize) -> Self {
        Self {
            delegation_hash,
            caveat_index,
        }
    }
}

/// Committed enforcer state, one counter per caveat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaveatState {
    counters: BTreeMap<CaveatKey, u64>,
}

impl CaveatState {
    /// Current counter for `key`, zero if never committed
    pub fn counter(&self, key: &CaveatKey) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Advance the counter for `key`, returning the new value
    pub fn increment(&mut self, key: CaveatKey) -> u64 {
        let count = self.counters.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }
}

/// Delegation status keyed by delegation hash, plus committed caveat state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationState {
    revoked: BTreeSet<DelegationHash>,
    consumed: BTreeSet<DelegationHash>,
    caveats: CaveatState,
}

impl DelegationState {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a delegation. Returns `false` if it was already disabled.
    pub fn disable(&mut self, hash: DelegationHash) -> bool {
        self.revoked.insert(hash)
    }

    /// Re-enable a disabled delegation. Returns `false` if it was not disabled.
    pub fn enable(&mut self, hash: DelegationHash) -> bool {
        self.revoked.remove(&hash)
    }

    /// Returns `true` if the delegation is disabled
    pub fn is_revoked(&self, hash: &DelegationHash) -> bool {
        self.revoked.contains(hash)
    }

    /// Returns `true` if the delegation was redeemed under single-use policy
    pub fn is_consumed(&self, hash: &DelegationHash) -> bool {
        self.consumed.contains(hash)
    }

    /// Record a single-use redemption
    pub fn mark_consumed(&mut self, hash: DelegationHash) {
        self.consumed.insert(hash);
    }

    /// Committed enforcer state
    pub fn caveats(&self) -> &CaveatState {
        &self.caveats
    }

    /// Committed enforcer state, for commit hooks
    pub fn caveats_mut(&mut self) -> &mut CaveatState {
        &mut self.caveats
    }

    /// Fault preventing redemption of `hash`, if any
    pub fn fault(&self, hash: &DelegationHash) -> Option<ChainFault> {
        if self.is_revoked(hash) {
            Some(ChainFault::Revoked)
        } else if self.is_consumed(hash) {
            Some(ChainFault::Consumed)
        } else {
            None
        }
    }
}
