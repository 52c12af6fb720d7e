//! Deterministic deployment and threshold-controlled accounts

use assert_matches::assert_matches;
use mandate_account::{
    sign_threshold, AccountCode, Blueprint, DeployError, DeployOutcome, Factory, InitCode, World,
};
use mandate_core::Address;
use mandate_delegation::{AccountAuthorization, Delegation, RedemptionError};
use mandate_testkit::{KeySetBuilder, WorldFixture};
use proptest::prelude::*;

fn counter_code() -> InitCode {
    InitCode::new(&Blueprint::Counter { owner: None }).unwrap()
}

#[test]
fn deployment_lands_at_the_computed_address() {
    let mut world = World::default();
    let factory = Factory::default();
    let code = counter_code();
    let expected = Factory::compute_address(7, &code.hash(), factory.address());

    assert_eq!(
        factory.deploy(&mut world, &code, 7),
        Ok(DeployOutcome::Deployed(expected))
    );
    assert!(world.counter(&expected).is_some());
}

#[test]
fn redeploying_is_a_no_op() {
    let mut fixture = WorldFixture::new();
    let delegation = fixture.delegate_to_bob(vec![]);
    let action = fixture.increment();
    fixture.redeem_as_bob(vec![delegation], action).unwrap();

    let code = InitCode::new(&Blueprint::Counter {
        owner: Some(fixture.alice.account),
    })
    .unwrap();
    let outcome = fixture.factory.deploy(&mut fixture.world, &code, 0).unwrap();

    assert_eq!(outcome, DeployOutcome::AlreadyDeployed(fixture.counter));
    assert_eq!(fixture.count(), 1);
}

#[test]
fn salt_and_factory_change_the_address() {
    let code = counter_code();
    let a = Factory::compute_address(0, &code.hash(), Address::new([1; 20]));
    let b = Factory::compute_address(1, &code.hash(), Address::new([1; 20]));
    let c = Factory::compute_address(0, &code.hash(), Address::new([2; 20]));
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn malformed_blueprints_are_rejected() {
    let mut world = World::default();
    let factory = Factory::default();

    assert_matches!(
        factory.deploy(&mut world, &InitCode::from_bytes(vec![0xff; 3]), 0),
        Err(DeployError::InvalidInitCode { .. })
    );

    let empty = InitCode::new(&Blueprint::SmartAccount {
        signers: vec![],
        threshold: 1,
    })
    .unwrap();
    assert_matches!(
        factory.deploy(&mut world, &empty, 0),
        Err(DeployError::InvalidBlueprint { .. })
    );
}

#[test]
fn ensure_deployed_creates_lazily() {
    let mut world = World::default();
    let factory = Factory::default();
    let code = counter_code();
    let address = factory.address_of(&code, 3);

    assert!(!world.ledger().is_deployed(&address));
    assert_eq!(factory.ensure_deployed(&mut world, &code, 3), Ok(address));
    assert_eq!(factory.ensure_deployed(&mut world, &code, 3), Ok(address));
    assert_matches!(world.ledger().code(&address), Some(AccountCode::Counter(_)));
}

#[test]
fn threshold_account_delegates_with_two_of_three() {
    let mut fixture = WorldFixture::new();
    let keys = KeySetBuilder::new(3).with_seed("treasury").build();
    let code = InitCode::new(&Blueprint::SmartAccount {
        signers: keys.iter().map(|k| k.public_bytes()).collect(),
        threshold: 2,
    })
    .unwrap();
    let treasury = fixture
        .factory
        .ensure_deployed(&mut fixture.world, &code, 0)
        .unwrap();
    fixture.world.fund(treasury, 50);

    let unsigned = Delegation::root(treasury, fixture.bob.account).build();
    let payload = unsigned.signing_payload(fixture.world.domain());

    let one = sign_threshold(&[(0, keys[0].signing_key())], &payload).unwrap();
    let carol = fixture.carol.account;
    let lone = unsigned.clone().with_signature(one);
    assert_matches!(
        fixture.redeem_as_bob(vec![lone], mandate_core::Action::transfer(carol, 10)),
        Err(RedemptionError::InvalidSignature { index: 0, .. })
    );

    let two = sign_threshold(
        &[(0, keys[0].signing_key()), (2, keys[2].signing_key())],
        &payload,
    )
    .unwrap();
    let signed = unsigned.with_signature(two);
    fixture
        .redeem_as_bob(vec![signed], mandate_core::Action::transfer(carol, 10))
        .unwrap();
    assert_eq!(fixture.world.balance(&treasury), 40);
    assert!(fixture
        .world
        .signers()
        .acts_for(&treasury, &keys[1].address()));
}

proptest! {
    #[test]
    fn computed_address_matches_deployment(salt in any::<u64>(), owner in any::<[u8; 20]>()) {
        let mut world = World::default();
        let factory = Factory::default();
        let code = InitCode::new(&Blueprint::Counter { owner: Some(Address::new(owner)) }).unwrap();

        let predicted = Factory::compute_address(salt, &code.hash(), factory.address());
        let outcome = factory.deploy(&mut world, &code, salt).unwrap();
        prop_assert_eq!(outcome, DeployOutcome::Deployed(predicted));
        prop_assert_eq!(
            factory.deploy(&mut world, &code, salt).unwrap(),
            DeployOutcome::AlreadyDeployed(predicted)
        );
    }
}
