//! Account authorization capability consumed by chain validation

use mandate_core::Address;
use std::sync::Arc;

/// Decides whether a signature is valid for an account.
///
/// Implementations may back an account with a single key, a threshold of
/// keys or anything else; validation only sees this interface.
pub trait AccountAuthorization: Send + Sync {
    /// Returns `true` if `signature` authorizes `payload` on behalf of `account`
    fn verify(&self, account: &Address, signature: &[u8], payload: &[u8]) -> bool;

    /// Returns `true` if `caller` may act as `account` when redeeming.
    ///
    /// A smart-account delegate whose authorized signer submits the
    /// redemption is the typical case.
    fn acts_for(&self, account: &Address, caller: &Address) -> bool {
        account == caller
    }
}

impl<T: AccountAuthorization + ?Sized> AccountAuthorization for &T {
    fn verify(&self, account: &Address, signature: &[u8], payload: &[u8]) -> bool {
        (**self).verify(account, signature, payload)
    }

    fn acts_for(&self, account: &Address, caller: &Address) -> bool {
        (**self).acts_for(account, caller)
    }
}

impl<T: AccountAuthorization + ?Sized> AccountAuthorization for Arc<T> {
    fn verify(&self, account: &Address, signature: &[u8], payload: &[u8]) -> bool {
        (**self).verify(account, signature, payload)
    }

    fn acts_for(&self, account: &Address, caller: &Address) -> bool {
        (**self).acts_for(account, caller)
    }
}
