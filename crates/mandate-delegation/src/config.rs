//! Redemption engine configuration

use mandate_core::hash;
use mandate_core::{Address, MandateConfig, MandateError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_chain_length`
pub const MAX_CHAIN_LENGTH_LIMIT: usize = 256;

/// Whether a delegation may be redeemed more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReusePolicy {
    /// Delegations stay valid until revoked
    #[default]
    Reusable,
    /// Every link of a successfully redeemed chain is consumed
    SingleUse,
}

/// Domain that delegation signatures are bound to.
///
/// Two engines with different domains never accept each other's signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningDomain {
    /// Human-readable protocol name
    pub name: String,
    /// Network identifier
    pub chain_id: u64,
    /// Address of the component verifying signatures
    pub verifying_contract: Address,
}

impl SigningDomain {
    /// 32-byte separator mixed into every signing payload
    pub fn separator(&self) -> [u8; 32] {
        let mut h = hash::hasher();
        h.update(b"mandate.domain.v1");
        h.update(&(self.name.len() as u64).to_be_bytes());
        h.update(self.name.as_bytes());
        h.update(&self.chain_id.to_be_bytes());
        h.update(self.verifying_contract.as_bytes());
        h.finalize()
    }
}

impl Default for SigningDomain {
    fn default() -> Self {
        Self {
            name: "mandate".to_string(),
            chain_id: 1,
            verifying_contract: Address::well_known("delegation-manager"),
        }
    }
}

/// Configuration of a `DelegationManager`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest chain accepted for redemption
    pub max_chain_length: usize,
    /// Replay policy for redeemed delegations
    pub reuse_policy: ReusePolicy,
    /// Accept `Address::ANY` as a terminal delegate
    pub allow_open_delegations: bool,
    /// Signature domain
    pub domain: SigningDomain,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_length: 16,
            reuse_policy: ReusePolicy::Reusable,
            allow_open_delegations: true,
            domain: SigningDomain::default(),
        }
    }
}

impl MandateConfig for EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.max_chain_length == 0 || self.max_chain_length > MAX_CHAIN_LENGTH_LIMIT {
            return Err(MandateError::invalid(format!(
                "max_chain_length must be within 1..={MAX_CHAIN_LENGTH_LIMIT}, got {}",
                self.max_chain_length
            )));
        }
        if self.domain.name.trim().is_empty() {
            return Err(MandateError::invalid("domain.name must not be empty"));
        }
        Ok(())
    }
}
