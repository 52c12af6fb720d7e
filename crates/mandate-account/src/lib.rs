//! Mandate Account - the in-memory world delegations act on
//!
//! - `World`: keys, balances, contracts and delegation state, with
//!   `redeem_delegations` as the entry point into the engine
//! - `KeyRegistry`: single-key and threshold account authorization
//! - `Counter`: a contract whose count makes executions observable
//! - `Factory`: deterministic, idempotent account deployment

#![forbid(unsafe_code)]

pub mod counter;
pub mod errors;
pub mod factory;
pub mod keys;
pub mod ledger;
pub mod world;

pub use counter::Counter;
pub use errors::{AccountError, DeployError};
pub use factory::{Blueprint, DeployOutcome, Factory, InitCode};
pub use keys::{sign_threshold, AccountKeys, KeyRegistry, SignatureShare};
pub use ledger::{AccountCode, Ledger};
pub use world::World;
