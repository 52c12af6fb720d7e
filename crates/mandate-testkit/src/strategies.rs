//! Property test strategies for Mandate types

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use mandate_core::{Action, Address, Selector};

/// Strategy for arbitrary addresses
pub fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::new)
}

/// Strategy for arbitrary selectors
pub fn arb_selector() -> impl Strategy<Value = Selector> {
    any::<[u8; 4]>().prop_map(Selector::new)
}

/// Non-empty, duplicate-free set of addresses
pub fn arb_address_set(max: usize) -> impl Strategy<Value = Vec<Address>> {
    prop::collection::btree_set(arb_address(), 1..=max.max(1))
        .prop_map(|set| set.into_iter().collect())
}

/// Non-empty, duplicate-free set of selectors
pub fn arb_selector_set(max: usize) -> impl Strategy<Value = Vec<Selector>> {
    prop::collection::btree_set(arb_selector(), 1..=max.max(1))
        .prop_map(|set| set.into_iter().collect())
}

/// Call of `selector` on `target` with trailing argument bytes
pub fn arb_call(target: Address) -> impl Strategy<Value = Action> {
    (arb_selector(), prop::collection::vec(any::<u8>(), 0..32)).prop_map(move |(selector, args)| {
        let mut data = selector.as_bytes().to_vec();
        data.extend(args);
        Action::new(target, 0, data)
    })
}
