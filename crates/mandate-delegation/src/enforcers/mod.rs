//! Caveat enforcers
//!
//! Every caveat names an enforcer by address. The registry resolves that
//! address to an implementation of `CaveatEnforcer`; new kinds of restriction
//! are added by registering another implementation, never by touching the
//! redemption engine.
//!
//! Enforcers are shared across accounts and redemptions and hold no state of
//! their own. Stateful enforcers read the caller's `CaveatState` while
//! enforcing and write it only in `after_execution`, which runs once the
//! action has executed successfully.

mod allowed_methods;
mod allowed_targets;
mod limited_calls;
mod value_lte;

pub use allowed_methods::AllowedMethodsEnforcer;
pub use allowed_targets::AllowedTargetsEnforcer;
pub use limited_calls::LimitedCallsEnforcer;
pub use value_lte::ValueLteEnforcer;

use crate::errors::PolicyViolation;
use crate::state::{CaveatKey, CaveatState};
use mandate_core::{Action, Address, DelegationHash};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Inputs to a single caveat evaluation
#[derive(Debug, Clone, Copy)]
pub struct EnforcementContext<'a> {
    /// Signed enforcer configuration
    pub terms: &'a [u8],
    /// Untrusted redemption-time input
    pub args: &'a [u8],
    /// Action being authorized
    pub action: &'a Action,
    /// Hash of the delegation carrying the caveat
    pub delegation_hash: DelegationHash,
    /// Position of the caveat within that delegation
    pub caveat_index: usize,
    /// Delegator of that delegation
    pub delegator: Address,
    /// Party presenting the chain
    pub redeemer: Address,
}

impl EnforcementContext<'_> {
    /// Key of the caveat under evaluation in `CaveatState`
    pub fn key(&self) -> CaveatKey {
        CaveatKey::new(self.delegation_hash, self.caveat_index)
    }
}

/// A policy unit approving or rejecting one proposed action.
pub trait CaveatEnforcer: Send + Sync + fmt::Debug {
    /// Short stable name used in logs
    fn name(&self) -> &'static str;

    /// Approve or reject the action against the caveat's terms.
    ///
    /// `state` is the committed state as of this redemption; it is only read.
    fn enforce(
        &self,
        ctx: &EnforcementContext<'_>,
        state: &CaveatState,
    ) -> Result<(), PolicyViolation>;

    /// Commit hook run after the action executed successfully.
    fn after_execution(&self, _ctx: &EnforcementContext<'_>, _state: &mut CaveatState) {}
}

/// Split terms into fixed-width entries; the terms must hold at least one.
pub(crate) fn decode_fixed<const N: usize>(
    terms: &[u8],
    what: &str,
) -> Result<Vec<[u8; N]>, PolicyViolation> {
    if terms.is_empty() || terms.len() % N != 0 {
        return Err(PolicyViolation::malformed_terms(format!(
            "{what} terms must be a non-empty multiple of {N} bytes, got {}",
            terms.len()
        )));
    }
    Ok(terms
        .chunks_exact(N)
        .map(|chunk| {
            let mut entry = [0u8; N];
            entry.copy_from_slice(chunk);
            entry
        })
        .collect())
}

/// Address-indexed set of enforcers
#[derive(Debug, Clone, Default)]
pub struct EnforcerRegistry {
    enforcers: HashMap<Address, Arc<dyn CaveatEnforcer>>,
}

impl EnforcerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in enforcer at its well-known address
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            AllowedTargetsEnforcer::address(),
            Arc::new(AllowedTargetsEnforcer),
        );
        registry.register(
            AllowedMethodsEnforcer::address(),
            Arc::new(AllowedMethodsEnforcer),
        );
        registry.register(ValueLteEnforcer::address(), Arc::new(ValueLteEnforcer));
        registry.register(
            LimitedCallsEnforcer::address(),
            Arc::new(LimitedCallsEnforcer),
        );
        registry
    }

    /// Register an enforcer, returning any enforcer previously at `address`
    pub fn register(
        &mut self,
        address: Address,
        enforcer: Arc<dyn CaveatEnforcer>,
    ) -> Option<Arc<dyn CaveatEnforcer>> {
        self.enforcers.insert(address, enforcer)
    }

    /// Look up the enforcer at `address`
    pub fn resolve(&self, address: &Address) -> Option<Arc<dyn CaveatEnforcer>> {
        self.enforcers.get(address).cloned()
    }

    /// Number of registered enforcers
    pub fn len(&self) -> usize {
        self.enforcers.len()
    }

    /// Returns `true` if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.enforcers.is_empty()
    }
}
