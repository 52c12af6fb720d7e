//! Reference scenario: alice lets bob increment her counter
//!
//! Alice's smart account delegates to bob's with
//! `[AllowedTargets({counter}), AllowedMethods({increment})]`. With `--links`
//! greater than one, bob re-delegates further down a chain of accounts and the
//! last one redeems. The flags swap either allowed set for one that excludes
//! the call, demonstrating a policy rejection.

use anyhow::{ensure, Result};
use clap::Args;
use mandate_account::{Blueprint, Counter, Factory, InitCode, World};
use mandate_core::{ed25519_key_from_seed, hash, Action, Address, Ed25519SigningKey};
use mandate_delegation::{
    AllowedMethodsEnforcer, AllowedTargetsEnforcer, Delegation, DelegationManager, EngineConfig,
    EnforcerRegistry, ExecutionReceipt, RedemptionError,
};
use std::fmt;
use std::sync::Arc;
use tracing::info;
use zeroize::Zeroize;

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Arguments for `mandate scenario`
#[derive(Args)]
pub struct ScenarioArgs {
    /// Allow a different target than the counter
    #[arg(long)]
    pub exclude_target: bool,

    /// Allow `reset()` instead of `increment()`
    #[arg(long)]
    pub exclude_method: bool,

    /// Number of delegations in the chain
    #[arg(long, default_value = "1")]
    pub links: usize,
}

/// What happened in one scenario run
#[derive(Debug)]
pub struct ScenarioReport {
    /// Chain length
    pub links: usize,
    /// Account the action executes as
    pub root: Address,
    /// Account presenting the chain
    pub redeemer: Address,
    /// Count before and after
    pub count: (u64, u64),
    /// Redeemer balance before and after
    pub redeemer_balance: (u128, u128),
    /// Redemption result
    pub outcome: Result<ExecutionReceipt, RedemptionError>,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "links:     {}", self.links)?;
        writeln!(f, "root:      {}", self.root)?;
        writeln!(f, "redeemer:  {}", self.redeemer)?;
        match &self.outcome {
            Ok(receipt) => writeln!(
                f,
                "outcome:   {} ({} caveats checked)",
                receipt.phase, receipt.caveats_checked
            )?,
            Err(err) => writeln!(f, "outcome:   {} ({err})", err.phase())?,
        }
        writeln!(f, "count:     {} -> {}", self.count.0, self.count.1)?;
        writeln!(
            f,
            "balance:   {} -> {} (redeemer)",
            self.redeemer_balance.0, self.redeemer_balance.1
        )
    }
}

fn actor_name(index: usize) -> String {
    NAMES
        .get(index)
        .map_or_else(|| format!("delegate-{index}"), |name| (*name).to_string())
}

fn actor_key(name: &str) -> Ed25519SigningKey {
    let mut seed = hash::hash_tagged("mandate.cli.scenario", name.as_bytes());
    let key = ed25519_key_from_seed(&seed);
    seed.zeroize();
    key
}

/// Build a fresh world, run the scenario and report
pub fn run(args: &ScenarioArgs, config: EngineConfig) -> Result<ScenarioReport> {
    ensure!(args.links >= 1, "a scenario needs at least one delegation");
    ensure!(
        args.links <= config.max_chain_length,
        "{} links exceed max_chain_length {}",
        args.links,
        config.max_chain_length
    );

    let manager = DelegationManager::new(config, EnforcerRegistry::with_builtins());
    let mut world = World::new(Arc::new(manager));
    let factory = Factory::default();
    let domain = world.domain().clone();

    let keys: Vec<Ed25519SigningKey> = (0..=args.links)
        .map(|i| actor_key(&actor_name(i)))
        .collect();
    let mut accounts = Vec::with_capacity(keys.len());
    for key in &keys {
        let code = InitCode::new(&Blueprint::SmartAccount {
            signers: vec![key.verifying_key().to_bytes()],
            threshold: 1,
        })?;
        accounts.push(factory.ensure_deployed(&mut world, &code, 0)?);
    }

    let counter = factory.ensure_deployed(
        &mut world,
        &InitCode::new(&Blueprint::Counter {
            owner: Some(accounts[0]),
        })?,
        0,
    )?;
    world.fund(accounts[0], 1_000);
    world.fund(accounts[1], 1_000);

    let allowed_target = if args.exclude_target {
        accounts[1]
    } else {
        counter
    };
    let allowed_method = if args.exclude_method {
        Counter::reset_selector()
    } else {
        Counter::increment_selector()
    };

    let mut chain = vec![Delegation::root(accounts[0], accounts[1])
        .caveat(AllowedTargetsEnforcer::caveat(&[allowed_target]))
        .caveat(AllowedMethodsEnforcer::caveat(&[allowed_method]))
        .build()
        .sign_with(&keys[0], &domain)];
    for i in 1..args.links {
        let link = Delegation::redelegate(&chain[i - 1], accounts[i + 1])
            .build()
            .sign_with(&keys[i], &domain);
        chain.push(link);
    }

    let redeemer = accounts[args.links];
    let count_of = |world: &World| world.counter(&counter).map_or(0, Counter::count);
    let count_before = count_of(&world);
    let balance_before = world.balance(&redeemer);

    info!(links = args.links, %redeemer, "Redeeming scenario chain");
    let action = Action::call(counter, Counter::increment_selector());
    let outcome = world.redeem_delegations(redeemer, chain, action, Vec::new());

    Ok(ScenarioReport {
        links: args.links,
        root: accounts[0],
        redeemer,
        count: (count_before, count_of(&world)),
        redeemer_balance: (balance_before, world.balance(&redeemer)),
        outcome,
    })
}
