//! Caveats: restrictions attached to a delegation

use mandate_core::Address;
use serde::{Deserialize, Serialize};

/// A policy restriction enforced at redemption time.
///
/// `terms` are chosen and signed by the delegator. `args` are supplied by the
/// redeemer, are not covered by the signature and must only ever be treated
/// as untrusted enforcer input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caveat {
    /// Address of the enforcer that evaluates this caveat
    pub enforcer: Address,
    /// Enforcer-specific configuration
    #[serde(with = "serde_bytes")]
    pub terms: Vec<u8>,
    /// Per-redemption input
    #[serde(with = "serde_bytes", default)]
    pub args: Vec<u8>,
}

impl Caveat {
    /// Create a caveat with empty args
    pub fn new(enforcer: Address, terms: impl Into<Vec<u8>>) -> Self {
        Self {
            enforcer,
            terms: terms.into(),
            args: Vec::new(),
        }
    }

    /// Attach redemption-time args
    pub fn with_args(mut self, args: impl Into<Vec<u8>>) -> Self {
        self.args = args.into();
        self
    }
}
