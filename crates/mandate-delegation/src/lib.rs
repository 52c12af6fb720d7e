//! Mandate Delegation - signed authority chains and caveat enforcement
//!
//! An account grants another party the right to act on its behalf by signing
//! a `Delegation`. Delegations can be re-delegated, forming a chain rooted at
//! the account whose authority is exercised. Every link may carry caveats,
//! each evaluated by a pluggable `CaveatEnforcer`.
//!
//! `DelegationManager::redeem` is the single entry point: it validates the
//! chain, runs every caveat in order and executes the action as the root
//! delegator through an `ExecutionEnvironment`. Either all of that succeeds
//! or nothing observable changes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mandate_delegation::*;
//!
//! let manager = DelegationManager::with_builtins();
//! let delegation = Delegation::root(alice, bob)
//!     .caveat(AllowedTargetsEnforcer::caveat(&[counter]))
//!     .build()
//!     .sign_with(&alice_key, &manager.config().domain);
//!
//! let request = RedemptionRequest::new(bob, vec![delegation], action);
//! let receipt = manager.redeem(ctx, &request)?;
//! ```

#![forbid(unsafe_code)]

pub mod authorization;
pub mod caveat;
pub mod chain;
pub mod config;
pub mod delegation;
pub mod enforcers;
pub mod errors;
pub mod redemption;
pub mod state;

pub use authorization::AccountAuthorization;
pub use caveat::Caveat;
pub use chain::{ChainValidator, ValidatedChain};
pub use config::{EngineConfig, ReusePolicy, SigningDomain, MAX_CHAIN_LENGTH_LIMIT};
pub use delegation::{Delegation, DelegationBuilder, ROOT_AUTHORITY};
pub use enforcers::{
    AllowedMethodsEnforcer, AllowedTargetsEnforcer, CaveatEnforcer, EnforcementContext,
    EnforcerRegistry, LimitedCallsEnforcer, ValueLteEnforcer,
};
pub use errors::{ChainFault, PolicyViolation, RedemptionError};
pub use redemption::{
    DelegationManager, ExecutionEnvironment, ExecutionReceipt, ExecutionRevert,
    RedemptionContext, RedemptionPhase, RedemptionRequest,
};
pub use state::{CaveatKey, CaveatState, DelegationState};

#[cfg(test)]
pub(crate) mod test_support;
