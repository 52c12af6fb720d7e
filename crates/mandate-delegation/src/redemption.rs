//! Redemption engine: chain validation → caveat enforcement → execution
//!
//! Each attempt moves through
//! `Pending → ChainValidating → CaveatsEvaluating → Executing → Executed`,
//! and stops in `ChainInvalid`, `PolicyRejected` or `ExecutionReverted` on
//! failure. Nothing observable changes before execution succeeds: validation
//! is read-only, enforcers only commit in their post-execution hook and the
//! environment executes atomically.

use crate::authorization::AccountAuthorization;
use crate::chain::{ChainValidator, ValidatedChain};
use crate::config::{EngineConfig, ReusePolicy};
use crate::delegation::Delegation;
use crate::enforcers::{CaveatEnforcer, EnforcementContext, EnforcerRegistry};
use crate::errors::{PolicyViolation, RedemptionError};
use crate::state::DelegationState;
use mandate_core::{Action, Address, DelegationHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of one redemption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedemptionPhase {
    /// Request received
    Pending,
    /// Checking signatures and linkage
    ChainValidating,
    /// Terminal: the chain did not validate
    ChainInvalid,
    /// Running caveat enforcers
    CaveatsEvaluating,
    /// Terminal: a caveat rejected the action
    PolicyRejected,
    /// Executing the action as the root delegator
    Executing,
    /// Terminal: the action executed
    Executed,
    /// Terminal: the authorized action failed
    ExecutionReverted,
}

impl RedemptionPhase {
    /// Returns `true` for phases that end an attempt
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ChainInvalid | Self::PolicyRejected | Self::Executed | Self::ExecutionReverted
        )
    }
}

impl fmt::Display for RedemptionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::ChainValidating => "chain-validating",
            Self::ChainInvalid => "chain-invalid",
            Self::CaveatsEvaluating => "caveats-evaluating",
            Self::PolicyRejected => "policy-rejected",
            Self::Executing => "executing",
            Self::Executed => "executed",
            Self::ExecutionReverted => "execution-reverted",
        };
        write!(f, "{name}")
    }
}

/// Failure reported by an execution environment. The environment guarantees
/// that a reverted call leaves no effect behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ExecutionRevert {
    /// Human-readable revert reason
    pub reason: String,
}

impl ExecutionRevert {
    /// Create a revert with a reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Something that can execute an action in an account's context
pub trait ExecutionEnvironment {
    /// Execute `action` with `account` as the acting identity, atomically.
    fn execute(&mut self, account: Address, action: &Action) -> Result<Vec<u8>, ExecutionRevert>;
}

/// Collaborators a redemption borrows for its duration
pub struct RedemptionContext<'a> {
    /// Signature verification for delegators
    pub authorization: &'a dyn AccountAuthorization,
    /// Where the action runs
    pub environment: &'a mut dyn ExecutionEnvironment,
    /// Revocation, single-use and committed caveat state
    pub state: &'a mut DelegationState,
}

/// A chain plus the action it should authorize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    /// Party presenting the chain
    pub redeemer: Address,
    /// Delegations, root-first
    pub chain: Vec<Delegation>,
    /// Action to execute as the root delegator
    pub action: Action,
    /// Args for each caveat in evaluation order. Missing trailing entries
    /// fall back to the caveat's own `args`.
    #[serde(default)]
    pub caveat_args: Vec<Vec<u8>>,
}

impl RedemptionRequest {
    /// Create a request without redemption-time args
    pub fn new(redeemer: Address, chain: Vec<Delegation>, action: Action) -> Self {
        Self {
            redeemer,
            chain,
            action,
            caveat_args: Vec::new(),
        }
    }

    /// Supply args per caveat, root-first across the chain
    pub fn with_caveat_args(mut self, caveat_args: Vec<Vec<u8>>) -> Self {
        self.caveat_args = caveat_args;
        self
    }

    /// Total caveats across the chain
    pub fn caveat_count(&self) -> usize {
        self.chain.iter().map(|d| d.caveats.len()).sum()
    }
}

/// Proof of a successful redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Account the action executed as
    pub root_delegator: Address,
    /// Party that presented the chain
    pub redeemer: Address,
    /// The executed action
    pub action: Action,
    /// Delegation hashes, root-first
    pub delegation_hashes: Vec<DelegationHash>,
    /// Number of caveats that approved
    pub caveats_checked: usize,
    /// Data returned by the executed call
    pub return_data: Vec<u8>,
    /// Always `Executed`
    pub phase: RedemptionPhase,
}

struct ApprovedCaveat<'r> {
    enforcer: Arc<dyn CaveatEnforcer>,
    terms: &'r [u8],
    args: &'r [u8],
    delegation_hash: DelegationHash,
    caveat_index: usize,
    delegator: Address,
}

/// Orchestrates validation, enforcement and execution
#[derive(Debug, Clone)]
pub struct DelegationManager {
    config: EngineConfig,
    enforcers: EnforcerRegistry,
}

impl DelegationManager {
    /// Create a manager
    pub fn new(config: EngineConfig, enforcers: EnforcerRegistry) -> Self {
        Self { config, enforcers }
    }

    /// Manager with default config and the built-in enforcers
    pub fn with_builtins() -> Self {
        Self::new(EngineConfig::default(), EnforcerRegistry::with_builtins())
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered enforcers
    pub fn enforcers(&self) -> &EnforcerRegistry {
        &self.enforcers
    }

    /// Validate a chain without redeeming it. Never changes state.
    pub fn validate_chain(
        &self,
        authorization: &dyn AccountAuthorization,
        state: &DelegationState,
        chain: &[Delegation],
        redeemer: Address,
    ) -> Result<ValidatedChain, RedemptionError> {
        ChainValidator::new(&self.config, authorization, state).validate(chain, redeemer)
    }

    /// Redeem a delegation chain: execute `request.action` as the root
    /// delegator iff the chain is valid and every caveat approves.
    pub fn redeem(
        &self,
        ctx: RedemptionContext<'_>,
        request: &RedemptionRequest,
    ) -> Result<ExecutionReceipt, RedemptionError> {
        let RedemptionContext {
            authorization,
            environment,
            state,
        } = ctx;
        let redeemer = request.redeemer;

        debug!(
            %redeemer,
            links = request.chain.len(),
            target = %request.action.target,
            phase = %RedemptionPhase::ChainValidating,
            "Starting redemption"
        );

        let validated = self
            .validate_chain(authorization, state, &request.chain, redeemer)
            .map_err(|err| {
                warn!(%redeemer, error = %err, phase = %err.phase(), "Redemption rejected");
                err
            })?;

        debug!(%redeemer, phase = %RedemptionPhase::CaveatsEvaluating, "Chain valid");
        let approved = self
            .enforce_caveats(request, &validated, state)
            .map_err(|err| {
                warn!(%redeemer, error = %err, phase = %err.phase(), "Redemption rejected");
                err
            })?;

        debug!(
            %redeemer,
            root = %validated.root_delegator,
            caveats = approved.len(),
            phase = %RedemptionPhase::Executing,
            "Caveats approved"
        );
        let return_data = environment
            .execute(validated.root_delegator, &request.action)
            .map_err(|revert| {
                warn!(
                    root = %validated.root_delegator,
                    reason = %revert.reason,
                    phase = %RedemptionPhase::ExecutionReverted,
                    "Authorized action reverted"
                );
                RedemptionError::ExecutionReverted {
                    root_delegator: validated.root_delegator,
                    reason: revert.reason,
                }
            })?;

        for caveat in &approved {
            caveat.enforcer.after_execution(
                &EnforcementContext {
                    terms: caveat.terms,
                    args: caveat.args,
                    action: &request.action,
                    delegation_hash: caveat.delegation_hash,
                    caveat_index: caveat.caveat_index,
                    delegator: caveat.delegator,
                    redeemer,
                },
                state.caveats_mut(),
            );
        }

        if self.config.reuse_policy == ReusePolicy::SingleUse {
            for hash in &validated.hashes {
                state.mark_consumed(*hash);
            }
        }

        info!(
            %redeemer,
            root = %validated.root_delegator,
            target = %request.action.target,
            links = validated.hashes.len(),
            phase = %RedemptionPhase::Executed,
            "Redemption executed"
        );

        Ok(ExecutionReceipt {
            root_delegator: validated.root_delegator,
            redeemer,
            action: request.action.clone(),
            delegation_hashes: validated.hashes,
            caveats_checked: approved.len(),
            return_data,
            phase: RedemptionPhase::Executed,
        })
    }

    /// Run every caveat in order, stopping at the first violation
    fn enforce_caveats<'r>(
        &self,
        request: &'r RedemptionRequest,
        validated: &ValidatedChain,
        state: &DelegationState,
    ) -> Result<Vec<ApprovedCaveat<'r>>, RedemptionError> {
        let total = request.caveat_count();
        if request.caveat_args.len() > total {
            return Err(RedemptionError::InvalidRequest {
                reason: format!(
                    "{} caveat args supplied for {total} caveats",
                    request.caveat_args.len()
                ),
            });
        }

        let mut approved = Vec::with_capacity(total);
        let mut flat_index = 0;
        for (delegation_index, delegation) in request.chain.iter().enumerate() {
            let delegation_hash = validated.hashes[delegation_index];
            for (caveat_index, caveat) in delegation.caveats.iter().enumerate() {
                let args = request
                    .caveat_args
                    .get(flat_index)
                    .map(Vec::as_slice)
                    .unwrap_or(caveat.args.as_slice());
                flat_index += 1;

                let violation = |violation: PolicyViolation| RedemptionError::PolicyViolation {
                    delegation_index,
                    caveat_index,
                    enforcer: caveat.enforcer,
                    violation,
                };

                let enforcer = self.enforcers.resolve(&caveat.enforcer).ok_or_else(|| {
                    violation(PolicyViolation::UnknownEnforcer {
                        enforcer: caveat.enforcer,
                    })
                })?;

                enforcer
                    .enforce(
                        &EnforcementContext {
                            terms: &caveat.terms,
                            args,
                            action: &request.action,
                            delegation_hash,
                            caveat_index,
                            delegator: delegation.delegator,
                            redeemer: validated.redeemer,
                        },
                        state.caveats(),
                    )
                    .map_err(violation)?;

                debug!(
                    delegation_index,
                    caveat_index,
                    enforcer = enforcer.name(),
                    "Caveat approved"
                );
                approved.push(ApprovedCaveat {
                    enforcer,
                    terms: &caveat.terms,
                    args,
                    delegation_hash,
                    caveat_index,
                    delegator: delegation.delegator,
                });
            }
        }
        Ok(approved)
    }
}

impl Default for DelegationManager {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caveat::Caveat;
    use crate::enforcers::{AllowedTargetsEnforcer, LimitedCallsEnforcer, ValueLteEnforcer};
    use crate::errors::ChainFault;
    use crate::state::CaveatKey;
    use crate::test_support::{Actor, KeyBook, RecordingEnforcer, RecordingEnvironment};
    use assert_matches::assert_matches;

    fn recording_manager(config: EngineConfig) -> (DelegationManager, Arc<RecordingEnforcer>) {
        let recorder = Arc::new(RecordingEnforcer::default());
        let mut registry = EnforcerRegistry::with_builtins();
        registry.register(RecordingEnforcer::address(), recorder.clone());
        (DelegationManager::new(config, registry), recorder)
    }

    fn recording(terms: &[u8]) -> Caveat {
        Caveat::new(RecordingEnforcer::address(), terms.to_vec())
    }

    struct Scenario {
        alice: Actor,
        bob: Actor,
        carol: Actor,
        book: KeyBook,
        state: DelegationState,
        env: RecordingEnvironment,
    }

    impl Scenario {
        fn new() -> Self {
            let (alice, bob, carol) =
                (Actor::from_seed(1), Actor::from_seed(2), Actor::from_seed(3));
            let book = KeyBook::default().with(&alice).with(&bob).with(&carol);
            Self {
                alice,
                bob,
                carol,
                book,
                state: DelegationState::new(),
                env: RecordingEnvironment::default(),
            }
        }

        fn redeem(
            &mut self,
            manager: &DelegationManager,
            request: &RedemptionRequest,
        ) -> Result<ExecutionReceipt, RedemptionError> {
            manager.redeem(
                RedemptionContext {
                    authorization: &self.book,
                    environment: &mut self.env,
                    state: &mut self.state,
                },
                request,
            )
        }
    }

    fn target() -> Address {
        Address::new([0xc0; 20])
    }

    #[test]
    fn executes_as_root_delegator() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address)
                .caveat(AllowedTargetsEnforcer::caveat(&[target()])),
        );
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation.clone()], Action::transfer(target(), 0));

        let receipt = s.redeem(&manager, &request).unwrap();

        assert_eq!(receipt.root_delegator, s.alice.address);
        assert_eq!(receipt.phase, RedemptionPhase::Executed);
        assert_eq!(receipt.caveats_checked, 1);
        assert_eq!(receipt.delegation_hashes, vec![delegation.hash()]);
        assert_eq!(s.env.executed, vec![(s.alice.address, request.action.clone())]);
    }

    #[test]
    fn empty_chain_executes_as_redeemer() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let request = RedemptionRequest::new(s.bob.address, Vec::new(), Action::transfer(target(), 1));

        let receipt = s.redeem(&manager, &request).unwrap();
        assert_eq!(receipt.root_delegator, s.bob.address);
        assert_eq!(receipt.caveats_checked, 0);
        assert_eq!(s.env.executed.len(), 1);
    }

    #[test]
    fn caveats_run_root_first_and_stop_at_first_rejection() {
        let mut s = Scenario::new();
        let (manager, recorder) = recording_manager(EngineConfig::default());
        let root = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address)
                .caveats([recording(b"root-0"), recording(b"root-1")]),
        );
        let link = s.bob.sign(
            Delegation::redelegate(&root, s.carol.address)
                .caveats([recording(b"reject"), recording(b"never")]),
        );
        let request =
            RedemptionRequest::new(s.carol.address, vec![root, link], Action::transfer(target(), 0));

        let err = s.redeem(&manager, &request).unwrap_err();

        assert_matches!(
            err,
            RedemptionError::PolicyViolation {
                delegation_index: 1,
                caveat_index: 0,
                ..
            }
        );
        assert_eq!(err.phase(), RedemptionPhase::PolicyRejected);
        assert_eq!(
            *recorder.enforced.lock(),
            vec![b"root-0".to_vec(), b"root-1".to_vec(), b"reject".to_vec()]
        );
        assert!(recorder.committed.lock().is_empty());
        assert!(s.env.executed.is_empty());
    }

    #[test]
    fn commit_hooks_run_only_after_successful_execution() {
        let mut s = Scenario::new();
        let (manager, recorder) = recording_manager(EngineConfig::default());
        let delegation = s
            .alice
            .sign(Delegation::root(s.alice.address, s.bob.address).caveat(recording(b"ok")));
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0));

        s.env = RecordingEnvironment::reverting("out of gas");
        let err = s.redeem(&manager, &request).unwrap_err();
        assert_eq!(
            err,
            RedemptionError::ExecutionReverted {
                root_delegator: s.alice.address,
                reason: "out of gas".to_string()
            }
        );
        assert!(recorder.committed.lock().is_empty());

        s.env = RecordingEnvironment::default();
        s.redeem(&manager, &request).unwrap();
        assert_eq!(*recorder.committed.lock(), vec![b"ok".to_vec()]);
    }

    #[test]
    fn limited_calls_survive_reverted_attempts() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address).caveat(LimitedCallsEnforcer::caveat(1)),
        );
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0));

        s.env = RecordingEnvironment::reverting("boom");
        assert!(s.redeem(&manager, &request).is_err());

        s.env = RecordingEnvironment::default();
        assert!(s.redeem(&manager, &request).is_ok());
        assert_matches!(
            s.redeem(&manager, &request),
            Err(RedemptionError::PolicyViolation {
                violation: PolicyViolation::CallLimitReached { limit: 1 },
                ..
            })
        );
    }

    #[test]
    fn sibling_limit_caveats_each_allow_their_own_calls() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address)
                .caveats([LimitedCallsEnforcer::caveat(2), LimitedCallsEnforcer::caveat(2)]),
        );
        let hash = delegation.hash();
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0));

        s.redeem(&manager, &request).unwrap();
        s.redeem(&manager, &request).unwrap();
        assert_eq!(s.state.caveats().counter(&CaveatKey::new(hash, 0)), 2);
        assert_eq!(s.state.caveats().counter(&CaveatKey::new(hash, 1)), 2);
        assert_matches!(
            s.redeem(&manager, &request),
            Err(RedemptionError::PolicyViolation {
                caveat_index: 0,
                violation: PolicyViolation::CallLimitReached { limit: 2 },
                ..
            })
        );
        assert_eq!(s.env.executed.len(), 2);
    }

    #[test]
    fn call_counts_belong_to_the_supplied_state() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address).caveat(LimitedCallsEnforcer::caveat(1)),
        );
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0));
        let untouched = s.state.clone();

        s.redeem(&manager, &request).unwrap();
        assert!(s.redeem(&manager, &request).is_err());

        s.state = untouched;
        assert!(s.redeem(&manager, &request).is_ok());
    }

    #[test]
    fn redemption_args_override_caveat_args() {
        let mut s = Scenario::new();
        let (manager, recorder) = recording_manager(EngineConfig::default());
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address).caveats([
                recording(b"a").with_args(b"stored-a".to_vec()),
                recording(b"b").with_args(b"stored-b".to_vec()),
            ]),
        );
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0))
                .with_caveat_args(vec![b"supplied".to_vec()]);

        s.redeem(&manager, &request).unwrap();
        assert_eq!(
            *recorder.seen_args.lock(),
            vec![b"supplied".to_vec(), b"stored-b".to_vec()]
        );
    }

    #[test]
    fn surplus_args_are_rejected() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let delegation = s.alice.sign(Delegation::root(s.alice.address, s.bob.address));
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0))
                .with_caveat_args(vec![vec![1]]);

        assert_matches!(
            s.redeem(&manager, &request),
            Err(RedemptionError::InvalidRequest { .. })
        );
        assert!(s.env.executed.is_empty());
    }

    #[test]
    fn unknown_enforcer_is_a_policy_violation() {
        let mut s = Scenario::new();
        let manager = DelegationManager::with_builtins();
        let stray = Address::new([0xee; 20]);
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address).caveat(Caveat::new(stray, vec![])),
        );
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 0));

        assert_matches!(
            s.redeem(&manager, &request),
            Err(RedemptionError::PolicyViolation {
                violation: PolicyViolation::UnknownEnforcer { enforcer },
                ..
            }) if enforcer == stray
        );
    }

    #[test]
    fn single_use_consumes_every_link() {
        let mut s = Scenario::new();
        let manager = DelegationManager::new(
            EngineConfig {
                reuse_policy: ReusePolicy::SingleUse,
                ..EngineConfig::default()
            },
            EnforcerRegistry::with_builtins(),
        );
        let root = s.alice.sign(Delegation::root(s.alice.address, s.bob.address));
        let link = s.bob.sign(Delegation::redelegate(&root, s.carol.address));
        let request = RedemptionRequest::new(
            s.carol.address,
            vec![root.clone(), link.clone()],
            Action::transfer(target(), 0),
        );

        s.redeem(&manager, &request).unwrap();
        assert!(s.state.is_consumed(&root.hash()));
        assert!(s.state.is_consumed(&link.hash()));
        assert_matches!(
            s.redeem(&manager, &request),
            Err(RedemptionError::BrokenChain {
                index: 0,
                fault: ChainFault::Consumed
            })
        );
    }

    #[test]
    fn rejected_redemption_leaves_single_use_state_untouched() {
        let mut s = Scenario::new();
        let manager = DelegationManager::new(
            EngineConfig {
                reuse_policy: ReusePolicy::SingleUse,
                ..EngineConfig::default()
            },
            EnforcerRegistry::with_builtins(),
        );
        let delegation = s.alice.sign(
            Delegation::root(s.alice.address, s.bob.address).caveat(ValueLteEnforcer::caveat(5)),
        );
        let request =
            RedemptionRequest::new(s.bob.address, vec![delegation], Action::transfer(target(), 6));

        assert!(s.redeem(&manager, &request).is_err());
        assert_eq!(s.state, DelegationState::new());
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(RedemptionPhase::ChainValidating.to_string(), "chain-validating");
        assert!(RedemptionPhase::ExecutionReverted.is_terminal());
        assert!(!RedemptionPhase::Executing.is_terminal());
    }
}
