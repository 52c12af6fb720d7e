//! Mandate Testing Infrastructure
//!
//! Shared fixtures so tests across the workspace build keys, actors and
//! worlds the same way.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! mandate-testkit = { path = "../mandate-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,ignore
//! use mandate_testkit::*;
//!
//! #[test]
//! fn bob_increments_for_alice() {
//!     let mut fixture = WorldFixture::new();
//!     let delegation = fixture.delegate_to_bob(vec![]);
//!     fixture.redeem_as_bob(vec![delegation], fixture.increment()).unwrap();
//! }
//! ```

pub mod actors;
pub mod fixtures;
pub mod keys;
pub mod strategies;

pub use actors::Actor;
pub use fixtures::WorldFixture;
pub use keys::{KeySetBuilder, KeyTestFixture};
