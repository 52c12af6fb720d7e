//! Signed delegations and their content hashes

use crate::caveat::Caveat;
use crate::config::SigningDomain;
use mandate_core::hash;
use mandate_core::{ed25519_sign, Address, DelegationHash, Ed25519SigningKey};
use serde::{Deserialize, Serialize};

/// Authority of a delegation issued directly by its delegator.
pub const ROOT_AUTHORITY: DelegationHash = DelegationHash::ROOT;

const DELEGATION_TAG: &[u8] = b"mandate.delegation.v1";

/// A signed grant of authority from `delegator` to `delegate`.
///
/// The hash covers every field except `signature` and the caveats' `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// Party receiving authority
    pub delegate: Address,
    /// Party granting authority
    pub delegator: Address,
    /// `ROOT_AUTHORITY` or the hash of the parent delegation
    pub authority: DelegationHash,
    /// Restrictions, evaluated in order
    pub caveats: Vec<Caveat>,
    /// Distinguishes otherwise identical delegations
    pub salt: u64,
    /// Signature by the delegator's account over `signing_payload`
    #[serde(with = "serde_bytes", default)]
    pub signature: Vec<u8>,
}

impl Delegation {
    /// Start a delegation issued at root authority
    pub fn root(delegator: Address, delegate: Address) -> DelegationBuilder {
        DelegationBuilder {
            delegate,
            delegator,
            authority: ROOT_AUTHORITY,
            caveats: Vec::new(),
            salt: 0,
        }
    }

    /// Start a re-delegation of `parent` from its delegate to `delegate`
    pub fn redelegate(parent: &Delegation, delegate: Address) -> DelegationBuilder {
        DelegationBuilder {
            delegate,
            delegator: parent.delegate,
            authority: parent.hash(),
            caveats: Vec::new(),
            salt: 0,
        }
    }

    /// Content hash identifying this delegation
    pub fn hash(&self) -> DelegationHash {
        let mut h = hash::hasher();
        h.update(DELEGATION_TAG);
        h.update(self.delegate.as_bytes());
        h.update(self.delegator.as_bytes());
        h.update(self.authority.as_bytes());
        h.update(&(self.caveats.len() as u64).to_be_bytes());
        for caveat in &self.caveats {
            h.update(caveat.enforcer.as_bytes());
            h.update(&(caveat.terms.len() as u64).to_be_bytes());
            h.update(&caveat.terms);
        }
        h.update(&self.salt.to_be_bytes());
        DelegationHash::new(h.finalize())
    }

    /// Bytes the delegator signs: the hash bound to a signing domain
    pub fn signing_payload(&self, domain: &SigningDomain) -> [u8; 32] {
        let mut h = hash::hasher();
        h.update(&domain.separator());
        h.update(self.hash().as_bytes());
        h.finalize()
    }

    /// Returns `true` if issued at root authority
    pub fn is_root(&self) -> bool {
        self.authority == ROOT_AUTHORITY
    }

    /// Sign with a single Ed25519 key
    pub fn sign_with(mut self, key: &Ed25519SigningKey, domain: &SigningDomain) -> Self {
        let payload = self.signing_payload(domain);
        self.signature = ed25519_sign(key, &payload).to_bytes().to_vec();
        self
    }

    /// Attach an externally produced signature (e.g. an aggregated threshold signature)
    pub fn with_signature(mut self, signature: impl Into<Vec<u8>>) -> Self {
        self.signature = signature.into();
        self
    }
}

/// Builder for unsigned delegations
#[derive(Debug, Clone)]
pub struct DelegationBuilder {
    delegate: Address,
    delegator: Address,
    authority: DelegationHash,
    caveats: Vec<Caveat>,
    salt: u64,
}

impl DelegationBuilder {
    /// Append a caveat
    pub fn caveat(mut self, caveat: Caveat) -> Self {
        self.caveats.push(caveat);
        self
    }

    /// Append several caveats
    pub fn caveats(mut self, caveats: impl IntoIterator<Item = Caveat>) -> Self {
        self.caveats.extend(caveats);
        self
    }

    /// Set the salt
    pub fn salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    /// Override the authority
    pub fn authority(mut self, authority: DelegationHash) -> Self {
        self.authority = authority;
        self
    }

    /// Finish with an empty signature
    pub fn build(self) -> Delegation {
        Delegation {
            delegate: self.delegate,
            delegator: self.delegator,
            authority: self.authority,
            caveats: self.caveats,
            salt: self.salt,
            signature: Vec::new(),
        }
    }
}
