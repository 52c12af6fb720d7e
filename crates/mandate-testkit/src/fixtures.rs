//! Pre-wired worlds
//!
//! `WorldFixture` deploys smart accounts for alice, bob and carol plus a
//! counter owned by alice, and funds alice and bob. Tests then only describe
//! the delegations they care about.

use crate::actors::Actor;
use mandate_account::{Blueprint, Factory, InitCode, World};
use mandate_core::{Action, Address};
use mandate_delegation::{
    Caveat, Delegation, DelegationManager, EngineConfig, EnforcerRegistry, ExecutionReceipt,
    RedemptionError,
};
use std::sync::Arc;

/// Starting balance of alice's and bob's smart accounts
pub const INITIAL_BALANCE: u128 = 1_000;

/// A world with three deployed actors and a counter
#[derive(Debug, Clone)]
pub struct WorldFixture {
    /// The world under test
    pub world: World,
    /// Factory every account was deployed through
    pub factory: Factory,
    /// Delegator in most scenarios
    pub alice: Actor,
    /// First delegate
    pub bob: Actor,
    /// Second-hop delegate
    pub carol: Actor,
    /// Counter contract owned by alice's account
    pub counter: Address,
}

impl Default for WorldFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldFixture {
    /// Fixture with default engine configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Fixture whose engine uses `config` and the built-in enforcers
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_manager(Arc::new(DelegationManager::new(
            config,
            EnforcerRegistry::with_builtins(),
        )))
    }

    /// Fixture redeeming through `manager`
    pub fn with_manager(manager: Arc<DelegationManager>) -> Self {
        let mut world = World::new(manager);
        let factory = Factory::default();
        let actor = |name: &str| Actor::named(name, &factory).expect("actor blueprint encodes");
        let (alice, bob, carol) = (actor("alice"), actor("bob"), actor("carol"));

        for person in [&alice, &bob, &carol] {
            factory
                .ensure_deployed(&mut world, &person.init_code, 0)
                .expect("actor account deploys");
            world.register_key(*person.key.verifying_key());
        }

        let counter_code = InitCode::new(&Blueprint::Counter {
            owner: Some(alice.account),
        })
        .expect("counter blueprint encodes");
        let counter = factory
            .ensure_deployed(&mut world, &counter_code, 0)
            .expect("counter deploys");

        world.fund(alice.account, INITIAL_BALANCE);
        world.fund(bob.account, INITIAL_BALANCE);

        Self {
            world,
            factory,
            alice,
            bob,
            carol,
            counter,
        }
    }

    /// `increment()` on the counter
    pub fn increment(&self) -> Action {
        Action::call(self.counter, mandate_account::Counter::increment_selector())
    }

    /// Current count
    pub fn count(&self) -> u64 {
        self.world
            .counter(&self.counter)
            .map(|counter| counter.count())
            .unwrap_or_default()
    }

    /// Root delegation from `from`'s account to `to`
    pub fn delegate(&self, from: &Actor, to: Address, caveats: Vec<Caveat>) -> Delegation {
        from.sign(
            Delegation::root(from.account, to).caveats(caveats),
            self.world.domain(),
        )
    }

    /// Root delegation from alice's account to bob's
    pub fn delegate_to_bob(&self, caveats: Vec<Caveat>) -> Delegation {
        self.delegate(&self.alice, self.bob.account, caveats)
    }

    /// Re-delegate `parent` from `from`'s account to `to`
    pub fn redelegate(
        &self,
        from: &Actor,
        parent: &Delegation,
        to: Address,
        caveats: Vec<Caveat>,
    ) -> Delegation {
        from.sign(
            Delegation::redelegate(parent, to).caveats(caveats),
            self.world.domain(),
        )
    }

    /// Redeem `chain` as `redeemer`
    pub fn redeem(
        &mut self,
        redeemer: Address,
        chain: Vec<Delegation>,
        action: Action,
    ) -> Result<ExecutionReceipt, RedemptionError> {
        self.world
            .redeem_delegations(redeemer, chain, action, Vec::new())
    }

    /// Redeem `chain` with bob's smart account as redeemer
    pub fn redeem_as_bob(
        &mut self,
        chain: Vec<Delegation>,
        action: Action,
    ) -> Result<ExecutionReceipt, RedemptionError> {
        self.redeem(self.bob.account, chain, action)
    }
}
