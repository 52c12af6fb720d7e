//! Balances and deployed code
//!
//! The ledger is the execution environment redemptions run against. Every
//! execution is all-or-nothing: the ledger is snapshotted before the call and
//! restored if the call reverts.

use crate::counter::Counter;
use mandate_core::{Action, Address};
use mandate_delegation::{ExecutionEnvironment, ExecutionRevert};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Code installed at a contract address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCode {
    /// A smart account; accepts plain value transfers
    SmartAccount,
    /// A counter contract
    Counter(Counter),
}

/// Native balances and contract code by address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Address, u128>,
    code: BTreeMap<Address, AccountCode>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Native balance of `account`
    pub fn balance(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Mint `amount` into `account`
    pub fn fund(&mut self, account: Address, amount: u128) {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Code at `account`, if any
    pub fn code(&self, account: &Address) -> Option<&AccountCode> {
        self.code.get(account)
    }

    /// Counter deployed at `account`, if any
    pub fn counter(&self, account: &Address) -> Option<&Counter> {
        match self.code.get(account) {
            Some(AccountCode::Counter(counter)) => Some(counter),
            _ => None,
        }
    }

    /// Returns `true` if code is installed at `account`
    pub fn is_deployed(&self, account: &Address) -> bool {
        self.code.contains_key(account)
    }

    /// Install code; returns `false` and leaves existing code untouched if
    /// `account` already has code
    pub fn install(&mut self, account: Address, code: AccountCode) -> bool {
        if self.is_deployed(&account) {
            return false;
        }
        self.code.insert(account, code);
        true
    }

    /// Move value and dispatch the call. Not atomic on its own.
    fn call(&mut self, caller: Address, action: &Action) -> Result<Vec<u8>, ExecutionRevert> {
        if action.value > 0 {
            self.transfer(caller, action.target, action.value)?;
        }

        match self.code.get_mut(&action.target) {
            Some(AccountCode::Counter(counter)) => counter.call(caller, action.value, &action.data),
            Some(AccountCode::SmartAccount) if !action.data.is_empty() => Err(
                ExecutionRevert::new(format!("account {} has no callable methods", action.target)),
            ),
            Some(AccountCode::SmartAccount) | None => Ok(Vec::new()),
        }
    }

    fn transfer(&mut self, from: Address, to: Address, value: u128) -> Result<(), ExecutionRevert> {
        let available = self.balance(&from);
        let remaining = available.checked_sub(value).ok_or_else(|| {
            ExecutionRevert::new(format!(
                "insufficient balance: {from} holds {available}, needs {value}"
            ))
        })?;
        self.balances.insert(from, remaining);
        self.fund(to, value);
        Ok(())
    }
}

impl ExecutionEnvironment for Ledger {
    fn execute(&mut self, account: Address, action: &Action) -> Result<Vec<u8>, ExecutionRevert> {
        let snapshot = self.clone();
        match self.call(account, action) {
            Ok(output) => {
                debug!(%account, target = %action.target, value = action.value, "Action executed");
                Ok(output)
            }
            Err(revert) => {
                *self = snapshot;
                warn!(%account, target = %action.target, reason = %revert, "Action reverted, ledger restored");
                Err(revert)
            }
        }
    }
}
