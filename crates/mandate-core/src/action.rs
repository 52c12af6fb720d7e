//! The unit of execution a redemption authorizes

use crate::identifiers::{Address, Selector};
use serde::{Deserialize, Serialize};

/// A call to execute: target account, native value and opaque call data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Account that receives the call
    pub target: Address,
    /// Native-currency amount transferred with the call
    pub value: u128,
    /// Call payload; the first four bytes select the invoked method
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl Action {
    /// Create a new action
    pub fn new(target: Address, value: u128, data: impl Into<Vec<u8>>) -> Self {
        Self {
            target,
            value,
            data: data.into(),
        }
    }

    /// Call `selector` on `target` with no value and no arguments
    pub fn call(target: Address, selector: Selector) -> Self {
        Self::new(target, 0, selector.as_bytes().to_vec())
    }

    /// Plain value transfer with empty call data
    pub fn transfer(target: Address, value: u128) -> Self {
        Self::new(target, value, Vec::new())
    }

    /// Leading method selector, if the data carries one
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_call_data(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_carries_selector() {
        let selector = Selector::from_signature("increment()");
        let action = Action::call(Address::new([1; 20]), selector);
        assert_eq!(action.selector(), Some(selector));
        assert_eq!(action.value, 0);
    }

    #[test]
    fn transfer_has_no_selector() {
        let action = Action::transfer(Address::new([1; 20]), 10);
        assert_eq!(action.selector(), None);
    }
}
