//! Account-layer errors

use mandate_core::{Address, MandateError};

/// Failures outside of redemption itself: revocation rights, deployment and
/// key registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// Only a delegation's delegator may disable or enable it
    #[error("{caller} is not the delegator {delegator}")]
    NotDelegator {
        /// Account attempting the change
        caller: Address,
        /// Delegator of the delegation
        delegator: Address,
    },

    /// A threshold key set cannot be satisfied
    #[error("threshold {threshold} is invalid for {keys} keys")]
    InvalidThreshold {
        /// Requested threshold
        threshold: u16,
        /// Number of registered keys
        keys: usize,
    },

    /// Deployment failed
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Deterministic deployment failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// Init code does not decode to a blueprint
    #[error("init code is not a valid blueprint: {reason}")]
    InvalidInitCode {
        /// Decoder message
        reason: String,
    },

    /// The blueprint describes an account that cannot exist
    #[error("blueprint rejected: {reason}")]
    InvalidBlueprint {
        /// What is wrong with the blueprint
        reason: String,
    },
}

impl DeployError {
    /// Create an invalid blueprint error
    pub fn invalid_blueprint(reason: impl Into<String>) -> Self {
        Self::InvalidBlueprint {
            reason: reason.into(),
        }
    }
}

impl From<MandateError> for DeployError {
    fn from(err: MandateError) -> Self {
        Self::InvalidInitCode {
            reason: err.to_string(),
        }
    }
}
