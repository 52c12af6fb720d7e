//! Mandate Core - shared vocabulary for delegable account authority
//!
//! This crate holds the types every other Mandate crate speaks in:
//!
//! - `Address`, `DelegationHash`, `Selector`: fixed-width identifiers
//! - `Action`: the call a redemption authorizes
//! - `hash`: the single hash algorithm selection point
//! - `crypto`: Ed25519 helpers for single-signer accounts
//! - `encoding`: canonical bincode encoding for init code and signature bundles
//! - `config`: layered configuration trait
//! - `errors`: the unified `MandateError`
//!
//! It contains no policy and no execution logic.

#![forbid(unsafe_code)]

pub mod action;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod errors;
pub mod hash;
pub mod identifiers;

pub use action::Action;
pub use config::MandateConfig;
pub use crypto::{
    ed25519_key_from_seed, ed25519_sign, ed25519_verify, Ed25519Signature, Ed25519SigningKey,
    Ed25519VerifyingKey,
};
pub use errors::{MandateError, Result};
pub use identifiers::{Address, DelegationHash, Selector};
