//! Redemption error taxonomy
//!
//! Every failure names the step that rejected the redemption and the link or
//! caveat responsible. All variants are terminal for the attempt.

use crate::redemption::RedemptionPhase;
use mandate_core::{Address, DelegationHash, Selector};
use serde::{Deserialize, Serialize};

/// Why a caveat enforcer rejected an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PolicyViolation {
    /// The action's target is not in the permitted set
    #[error("target {target} is not allowed")]
    TargetNotAllowed {
        /// Rejected target
        target: Address,
    },

    /// The call data's selector is not in the permitted set
    #[error("method {selector} is not allowed")]
    MethodNotAllowed {
        /// Rejected selector
        selector: Selector,
    },

    /// The call data is too short to carry a selector
    #[error("call data of {length} bytes carries no method selector")]
    MissingSelector {
        /// Length of the call data
        length: usize,
    },

    /// The action transfers more value than permitted
    #[error("value {value} exceeds the permitted maximum {max}")]
    ValueExceeded {
        /// Requested value
        value: u128,
        /// Permitted maximum
        max: u128,
    },

    /// The delegation has been redeemed the permitted number of times
    #[error("call limit of {limit} reached")]
    CallLimitReached {
        /// Configured limit
        limit: u64,
    },

    /// The signed terms cannot be decoded by the enforcer
    #[error("malformed terms: {reason}")]
    MalformedTerms {
        /// What was wrong with the terms
        reason: String,
    },

    /// No enforcer is registered at the caveat's enforcer address
    #[error("no enforcer registered at {enforcer}")]
    UnknownEnforcer {
        /// Address named by the caveat
        enforcer: Address,
    },

    /// Enforcer-specific rejection
    #[error("{0}")]
    Custom(String),
}

impl PolicyViolation {
    /// Create a malformed terms violation
    pub fn malformed_terms(reason: impl Into<String>) -> Self {
        Self::MalformedTerms {
            reason: reason.into(),
        }
    }
}

/// Why the authority chain does not hold together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ChainFault {
    /// The chain has more links than the engine accepts
    #[error("chain of {length} links exceeds the limit of {limit}")]
    TooLong {
        /// Submitted chain length
        length: usize,
        /// Configured maximum
        limit: usize,
    },

    /// The first delegation is not issued at root authority
    #[error("first delegation is not issued at root authority")]
    NotRootAuthority,

    /// A delegation does not reference its predecessor's hash
    #[error("authority {found} does not match parent hash {expected}")]
    AuthorityMismatch {
        /// Hash of the preceding delegation
        expected: DelegationHash,
        /// Authority the link actually names
        found: DelegationHash,
    },

    /// A delegation's delegator is not its predecessor's delegate
    #[error("delegator {found} is not the parent delegate {expected}")]
    DelegatorMismatch {
        /// Delegate of the preceding delegation
        expected: Address,
        /// Delegator the link actually names
        found: Address,
    },

    /// The delegation has been disabled by its delegator
    #[error("delegation has been revoked")]
    Revoked,

    /// The delegation was already redeemed under single-use policy
    #[error("delegation has already been redeemed")]
    Consumed,

    /// The redeemer is not the terminal delegate
    #[error("redeemer {redeemer} is not the delegate {delegate}")]
    RedeemerNotDelegate {
        /// Terminal delegate of the chain
        delegate: Address,
        /// Party presenting the chain
        redeemer: Address,
    },
}

/// Typed failure of a redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedemptionError {
    /// A delegation's signature does not verify against its delegator
    #[error("delegation {index}: signature does not verify for delegator {delegator}")]
    InvalidSignature {
        /// Position of the offending link, root-first
        index: usize,
        /// Claimed delegator
        delegator: Address,
    },

    /// Authority linkage or delegate continuity is violated
    #[error("delegation {index}: broken chain: {fault}")]
    BrokenChain {
        /// Position of the offending link, root-first
        index: usize,
        /// What is wrong with the link
        fault: ChainFault,
    },

    /// A caveat rejected the action
    #[error("delegation {delegation_index}, caveat {caveat_index} ({enforcer}): {violation}")]
    PolicyViolation {
        /// Position of the delegation carrying the caveat, root-first
        delegation_index: usize,
        /// Position of the caveat within its delegation
        caveat_index: usize,
        /// Enforcer the caveat names
        enforcer: Address,
        /// The enforcer's reason
        violation: PolicyViolation,
    },

    /// The authorized action itself failed
    #[error("action reverted executing as {root_delegator}: {reason}")]
    ExecutionReverted {
        /// Account the action executed as
        root_delegator: Address,
        /// Revert reason reported by the environment
        reason: String,
    },

    /// The request itself is malformed
    #[error("invalid redemption request: {reason}")]
    InvalidRequest {
        /// What is wrong with the request
        reason: String,
    },
}

impl RedemptionError {
    /// Terminal phase the attempt ended in
    pub fn phase(&self) -> RedemptionPhase {
        match self {
            Self::InvalidSignature { .. } | Self::BrokenChain { .. } => {
                RedemptionPhase::ChainInvalid
            }
            Self::PolicyViolation { .. } | Self::InvalidRequest { .. } => {
                RedemptionPhase::PolicyRejected
            }
            Self::ExecutionReverted { .. } => RedemptionPhase::ExecutionReverted,
        }
    }

    pub(crate) fn broken(index: usize, fault: ChainFault) -> Self {
        Self::BrokenChain { index, fault }
    }
}
