//! Named test actors, each owning one key and one smart account

use crate::keys::KeyTestFixture;
use mandate_account::{Blueprint, DeployError, Factory, InitCode};
use mandate_core::Address;
use mandate_delegation::{Delegation, DelegationBuilder, SigningDomain};

/// A person in a test scenario.
///
/// `key.address()` is the actor's externally owned account; `account` is
/// the smart account the actor's key controls once deployed.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Label used in logs and assertions
    pub name: String,
    /// Signing key
    pub key: KeyTestFixture,
    /// Counterfactual smart-account address
    pub account: Address,
    /// Init code of the smart account
    pub init_code: InitCode,
}

impl Actor {
    /// Actor whose key derives from `name` and whose account deploys
    /// through `factory` at salt 0
    pub fn named(name: &str, factory: &Factory) -> Result<Self, DeployError> {
        let key = KeyTestFixture::from_seed_string(name);
        let init_code = InitCode::new(&Blueprint::SmartAccount {
            signers: vec![key.public_bytes()],
            threshold: 1,
        })?;
        Ok(Self {
            name: name.to_string(),
            account: factory.address_of(&init_code, 0),
            key,
            init_code,
        })
    }

    /// Address of the actor's own key
    pub fn eoa(&self) -> Address {
        self.key.address()
    }

    /// Sign a delegation on behalf of the smart account
    pub fn sign(&self, builder: DelegationBuilder, domain: &SigningDomain) -> Delegation {
        self.key.sign_delegation(builder, domain)
    }
}
