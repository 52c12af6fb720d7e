//! Delegation chain validation
//!
//! A chain is supplied root-first and checked in one linear pass. Validation
//! only reads its inputs; it never changes delegation state, so it is safe to
//! call speculatively.

use crate::authorization::AccountAuthorization;
use crate::config::EngineConfig;
use crate::delegation::Delegation;
use crate::errors::{ChainFault, RedemptionError};
use crate::state::DelegationState;
use mandate_core::{Address, DelegationHash};
use tracing::debug;

/// A chain that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChain {
    /// Account the action executes as: `d0.delegator`, or the redeemer for
    /// an empty chain
    pub root_delegator: Address,
    /// Party presenting the chain
    pub redeemer: Address,
    /// Delegation hashes, root-first
    pub hashes: Vec<DelegationHash>,
}

impl ValidatedChain {
    /// Returns `true` if the redeemer acts directly, without delegation
    pub fn is_direct(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Verifies signatures, linkage, revocation and the terminal delegate
pub struct ChainValidator<'a> {
    config: &'a EngineConfig,
    authorization: &'a dyn AccountAuthorization,
    state: &'a DelegationState,
}

impl<'a> ChainValidator<'a> {
    /// Create a validator over read-only collaborators
    pub fn new(
        config: &'a EngineConfig,
        authorization: &'a dyn AccountAuthorization,
        state: &'a DelegationState,
    ) -> Self {
        Self {
            config,
            authorization,
            state,
        }
    }

    /// Validate `chain` (root-first) for redemption by `redeemer`
    pub fn validate(
        &self,
        chain: &[Delegation],
        redeemer: Address,
    ) -> Result<ValidatedChain, RedemptionError> {
        let Some(first) = chain.first() else {
            debug!(%redeemer, "Empty chain, redeemer acts as itself");
            return Ok(ValidatedChain {
                root_delegator: redeemer,
                redeemer,
                hashes: Vec::new(),
            });
        };

        if chain.len() > self.config.max_chain_length {
            return Err(RedemptionError::broken(
                self.config.max_chain_length,
                ChainFault::TooLong {
                    length: chain.len(),
                    limit: self.config.max_chain_length,
                },
            ));
        }

        let hashes: Vec<DelegationHash> = chain.iter().map(Delegation::hash).collect();

        for (index, delegation) in chain.iter().enumerate() {
            let payload = delegation.signing_payload(&self.config.domain);
            if !self
                .authorization
                .verify(&delegation.delegator, &delegation.signature, &payload)
            {
                return Err(RedemptionError::InvalidSignature {
                    index,
                    delegator: delegation.delegator,
                });
            }
        }

        if !first.is_root() {
            return Err(RedemptionError::broken(0, ChainFault::NotRootAuthority));
        }

        for (index, pair) in chain.windows(2).enumerate() {
            let (parent, link) = (&pair[0], &pair[1]);
            let index = index + 1;
            if link.authority != hashes[index - 1] {
                return Err(RedemptionError::broken(
                    index,
                    ChainFault::AuthorityMismatch {
                        expected: hashes[index - 1],
                        found: link.authority,
                    },
                ));
            }
            if link.delegator != parent.delegate {
                return Err(RedemptionError::broken(
                    index,
                    ChainFault::DelegatorMismatch {
                        expected: parent.delegate,
                        found: link.delegator,
                    },
                ));
            }
        }

        for (index, hash) in hashes.iter().enumerate() {
            if let Some(fault) = self.state.fault(hash) {
                return Err(RedemptionError::broken(index, fault));
            }
        }

        let last_index = chain.len() - 1;
        let delegate = chain[last_index].delegate;
        if !self.redeemer_may_act_as(delegate, redeemer) {
            return Err(RedemptionError::broken(
                last_index,
                ChainFault::RedeemerNotDelegate { delegate, redeemer },
            ));
        }

        debug!(
            links = chain.len(),
            root = %first.delegator,
            %redeemer,
            "Delegation chain validated"
        );

        Ok(ValidatedChain {
            root_delegator: first.delegator,
            redeemer,
            hashes,
        })
    }

    fn redeemer_may_act_as(&self, delegate: Address, redeemer: Address) -> bool {
        delegate == redeemer
            || (self.config.allow_open_delegations && delegate == Address::ANY)
            || self.authorization.acts_for(&delegate, &redeemer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Actor, KeyBook};
    use assert_matches::assert_matches;

    struct Fixture {
        alice: Actor,
        bob: Actor,
        carol: Actor,
        book: KeyBook,
        config: EngineConfig,
        state: DelegationState,
    }

    fn fixture() -> Fixture {
        let (alice, bob, carol) = (Actor::from_seed(1), Actor::from_seed(2), Actor::from_seed(3));
        let book = KeyBook::default().with(&alice).with(&bob).with(&carol);
        Fixture {
            alice,
            bob,
            carol,
            book,
            config: EngineConfig::default(),
            state: DelegationState::new(),
        }
    }

    impl Fixture {
        fn validator(&self) -> ChainValidator<'_> {
            ChainValidator::new(&self.config, &self.book, &self.state)
        }

        fn two_links(&self) -> Vec<Delegation> {
            let root = self
                .alice
                .sign(Delegation::root(self.alice.address, self.bob.address));
            let link = self
                .bob
                .sign(Delegation::redelegate(&root, self.carol.address));
            vec![root, link]
        }
    }

    #[test]
    fn empty_chain_acts_as_redeemer() {
        let f = fixture();
        let validated = f.validator().validate(&[], f.bob.address).unwrap();
        assert!(validated.is_direct());
        assert_eq!(validated.root_delegator, f.bob.address);
    }

    #[test]
    fn two_link_chain_resolves_to_root() {
        let f = fixture();
        let chain = f.two_links();
        let validated = f.validator().validate(&chain, f.carol.address).unwrap();
        assert_eq!(validated.root_delegator, f.alice.address);
        assert_eq!(validated.hashes, vec![chain[0].hash(), chain[1].hash()]);
    }

    #[test]
    fn signature_by_wrong_key_is_rejected() {
        let f = fixture();
        let forged = f
            .bob
            .sign(Delegation::root(f.alice.address, f.bob.address));
        assert_matches!(
            f.validator().validate(&[forged], f.bob.address),
            Err(RedemptionError::InvalidSignature { index: 0, .. })
        );
    }

    #[test]
    fn first_link_must_be_root() {
        let f = fixture();
        let chain = f.two_links();
        assert_matches!(
            f.validator().validate(&chain[1..], f.carol.address),
            Err(RedemptionError::BrokenChain {
                index: 0,
                fault: ChainFault::NotRootAuthority
            })
        );
    }

    #[test]
    fn authority_must_reference_parent() {
        let f = fixture();
        let root = f.alice.sign(Delegation::root(f.alice.address, f.bob.address));
        let other = f
            .alice
            .sign(Delegation::root(f.alice.address, f.bob.address).salt(7));
        let link = f.bob.sign(Delegation::redelegate(&other, f.carol.address));
        assert_matches!(
            f.validator().validate(&[root, link], f.carol.address),
            Err(RedemptionError::BrokenChain {
                index: 1,
                fault: ChainFault::AuthorityMismatch { .. }
            })
        );
    }

    #[test]
    fn delegator_must_be_parent_delegate() {
        let f = fixture();
        let root = f.alice.sign(Delegation::root(f.alice.address, f.bob.address));
        let link = f.carol.sign(
            Delegation::root(f.carol.address, f.carol.address).authority(root.hash()),
        );
        assert_matches!(
            f.validator().validate(&[root, link], f.carol.address),
            Err(RedemptionError::BrokenChain {
                index: 1,
                fault: ChainFault::DelegatorMismatch { .. }
            })
        );
    }

    #[test]
    fn revoked_intermediate_link_breaks_chain() {
        let mut f = fixture();
        let chain = f.two_links();
        f.state.disable(chain[1].hash());
        assert_matches!(
            f.validator().validate(&chain, f.carol.address),
            Err(RedemptionError::BrokenChain {
                index: 1,
                fault: ChainFault::Revoked
            })
        );
    }

    #[test]
    fn redeemer_must_be_terminal_delegate() {
        let f = fixture();
        let chain = f.two_links();
        assert_matches!(
            f.validator().validate(&chain, f.bob.address),
            Err(RedemptionError::BrokenChain {
                index: 1,
                fault: ChainFault::RedeemerNotDelegate { .. }
            })
        );
    }

    #[test]
    fn open_delegation_depends_on_config() {
        let mut f = fixture();
        let open = f.alice.sign(Delegation::root(f.alice.address, Address::ANY));
        assert!(f
            .validator()
            .validate(std::slice::from_ref(&open), f.carol.address)
            .is_ok());

        f.config.allow_open_delegations = false;
        assert_matches!(
            f.validator().validate(&[open], f.carol.address),
            Err(RedemptionError::BrokenChain {
                fault: ChainFault::RedeemerNotDelegate { .. },
                ..
            })
        );
    }

    #[test]
    fn operator_may_redeem_for_delegate() {
        let f = fixture();
        let account = Address::new([0x5a; 20]);
        let book = KeyBook::default()
            .with(&f.alice)
            .with_operator(account, f.carol.address);
        let delegation = f.alice.sign(Delegation::root(f.alice.address, account));
        let validator = ChainValidator::new(&f.config, &book, &f.state);
        assert!(validator.validate(&[delegation], f.carol.address).is_ok());
    }

    #[test]
    fn overlong_chain_is_rejected_before_signatures() {
        let mut f = fixture();
        f.config.max_chain_length = 1;
        let chain = f.two_links();
        assert_matches!(
            f.validator().validate(&chain, f.carol.address),
            Err(RedemptionError::BrokenChain {
                fault: ChainFault::TooLong { length: 2, limit: 1 },
                ..
            })
        );
    }
}
