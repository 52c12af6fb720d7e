//! Counter contract used to observe executions

use mandate_core::{Address, Selector};
use mandate_delegation::ExecutionRevert;
use serde::{Deserialize, Serialize};

/// A contract holding one count and an owner allowed to reset it.
///
/// Methods: `increment()`, `reset()` (owner only) and `count()`. Every method
/// returns the count as 8 big-endian bytes. Native value sent with a call is
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    count: u64,
    owner: Option<Address>,
}

impl Counter {
    /// `increment()`
    pub fn increment_selector() -> Selector {
        Selector::from_signature("increment()")
    }

    /// `reset()`
    pub fn reset_selector() -> Selector {
        Selector::from_signature("reset()")
    }

    /// `count()`
    pub fn count_selector() -> Selector {
        Selector::from_signature("count()")
    }

    /// Counter owned by `owner`
    pub fn owned_by(owner: Address) -> Self {
        Self {
            count: 0,
            owner: Some(owner),
        }
    }

    /// Current count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Dispatch a call
    pub fn call(
        &mut self,
        caller: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<u8>, ExecutionRevert> {
        if value != 0 {
            return Err(ExecutionRevert::new("counter does not accept value"));
        }
        let selector = Selector::from_call_data(data)
            .ok_or_else(|| ExecutionRevert::new("counter: missing selector"))?;

        if selector == Self::increment_selector() {
            self.count = self
                .count
                .checked_add(1)
                .ok_or_else(|| ExecutionRevert::new("counter overflow"))?;
        } else if selector == Self::reset_selector() {
            if self.owner.is_some_and(|owner| owner != caller) {
                return Err(ExecutionRevert::new(format!(
                    "counter: {caller} is not the owner"
                )));
            }
            self.count = 0;
        } else if selector != Self::count_selector() {
            return Err(ExecutionRevert::new(format!(
                "counter: unknown method {selector}"
            )));
        }
        Ok(self.count.to_be_bytes().to_vec())
    }
}
