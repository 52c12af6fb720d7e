//! The account world: keys, ledger, delegation state and the engine
//!
//! A `World` owns all mutable state a redemption can touch. Every scenario
//! builds its own world, so revocations and counters never leak between
//! tests.

use crate::counter::Counter;
use crate::errors::AccountError;
use crate::keys::KeyRegistry;
use crate::ledger::Ledger;
use mandate_core::{Action, Address, Ed25519VerifyingKey};
use mandate_delegation::{
    AccountAuthorization, Delegation, DelegationManager, DelegationState, ExecutionReceipt,
    RedemptionContext, RedemptionError, RedemptionRequest, SigningDomain,
};
use std::sync::Arc;
use tracing::info;

/// In-memory accounts plus the redemption engine that acts on them
#[derive(Debug, Clone)]
pub struct World {
    signers: KeyRegistry,
    ledger: Ledger,
    delegations: DelegationState,
    manager: Arc<DelegationManager>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Arc::new(DelegationManager::with_builtins()))
    }
}

impl World {
    /// Empty world redeeming through `manager`
    pub fn new(manager: Arc<DelegationManager>) -> Self {
        Self {
            signers: KeyRegistry::new(),
            ledger: Ledger::new(),
            delegations: DelegationState::new(),
            manager,
        }
    }

    /// The redemption engine
    pub fn manager(&self) -> &DelegationManager {
        &self.manager
    }

    /// Domain delegations must be signed for
    pub fn domain(&self) -> &SigningDomain {
        &self.manager.config().domain
    }

    /// Account keys
    pub fn signers(&self) -> &KeyRegistry {
        &self.signers
    }

    /// Mutable account keys
    pub fn signers_mut(&mut self) -> &mut KeyRegistry {
        &mut self.signers
    }

    /// Balances and code
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable balances and code
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Revocation and single-use state
    pub fn delegations(&self) -> &DelegationState {
        &self.delegations
    }

    /// Register an externally owned account
    pub fn register_key(&mut self, key: Ed25519VerifyingKey) -> Address {
        self.signers.register_key(key)
    }

    /// Mint native value
    pub fn fund(&mut self, account: Address, amount: u128) {
        self.ledger.fund(account, amount);
    }

    /// Native balance
    pub fn balance(&self, account: &Address) -> u128 {
        self.ledger.balance(account)
    }

    /// Counter deployed at `address`
    pub fn counter(&self, address: &Address) -> Option<&Counter> {
        self.ledger.counter(address)
    }

    /// Redeem `chain` (root-first) as `redeemer`, executing `action` as the
    /// root delegator
    pub fn redeem_delegations(
        &mut self,
        redeemer: Address,
        chain: Vec<Delegation>,
        action: Action,
        caveat_args: Vec<Vec<u8>>,
    ) -> Result<ExecutionReceipt, RedemptionError> {
        let request =
            RedemptionRequest::new(redeemer, chain, action).with_caveat_args(caveat_args);
        self.redeem(&request)
    }

    /// Redeem a prepared request
    pub fn redeem(
        &mut self,
        request: &RedemptionRequest,
    ) -> Result<ExecutionReceipt, RedemptionError> {
        self.manager.redeem(
            RedemptionContext {
                authorization: &self.signers,
                environment: &mut self.ledger,
                state: &mut self.delegations,
            },
            request,
        )
    }

    /// Disable `delegation`. Only its delegator, or a key acting for it, may.
    pub fn disable_delegation(
        &mut self,
        caller: Address,
        delegation: &Delegation,
    ) -> Result<bool, AccountError> {
        self.ensure_delegator(caller, delegation)?;
        let hash = delegation.hash();
        let changed = self.delegations.disable(hash);
        info!(%caller, delegation = %hash, changed, "Delegation disabled");
        Ok(changed)
    }

    /// Re-enable a disabled `delegation`. Same permission as disabling.
    pub fn enable_delegation(
        &mut self,
        caller: Address,
        delegation: &Delegation,
    ) -> Result<bool, AccountError> {
        self.ensure_delegator(caller, delegation)?;
        let hash = delegation.hash();
        let changed = self.delegations.enable(hash);
        info!(%caller, delegation = %hash, changed, "Delegation enabled");
        Ok(changed)
    }

    fn ensure_delegator(&self, caller: Address, delegation: &Delegation) -> Result<(), AccountError> {
        if self.signers.acts_for(&delegation.delegator, &caller) {
            Ok(())
        } else {
            Err(AccountError::NotDelegator {
                caller,
                delegator: delegation.delegator,
            })
        }
    }
}
