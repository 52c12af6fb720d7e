//! Caps how many times a delegation can be redeemed

use super::{CaveatEnforcer, EnforcementContext};
use crate::caveat::Caveat;
use crate::errors::PolicyViolation;
use crate::state::CaveatState;
use mandate_core::Address;

/// Terms: an 8-byte big-endian call limit.
///
/// Counts live in the caller's `CaveatState`, one per caveat, and only
/// advance after a successful execution, so rejected or reverted redemptions
/// never use up a call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitedCallsEnforcer;

impl LimitedCallsEnforcer {
    /// Well-known registry address
    pub fn address() -> Address {
        Address::well_known("enforcer.limited-calls")
    }

    /// Encode terms permitting `limit` calls
    pub fn terms(limit: u64) -> Vec<u8> {
        limit.to_be_bytes().to_vec()
    }

    /// Caveat permitting `limit` calls
    pub fn caveat(limit: u64) -> Caveat {
        Caveat::new(Self::address(), Self::terms(limit))
    }

    fn limit(terms: &[u8]) -> Result<u64, PolicyViolation> {
        let raw: [u8; 8] = terms.try_into().map_err(|_| {
            PolicyViolation::malformed_terms(format!(
                "limited-calls terms must be 8 bytes, got {}",
                terms.len()
            ))
        })?;
        Ok(u64::from_be_bytes(raw))
    }
}

impl CaveatEnforcer for LimitedCallsEnforcer {
    fn name(&self) -> &'static str {
        "limited-calls"
    }

    fn enforce(
        &self,
        ctx: &EnforcementContext<'_>,
        state: &CaveatState,
    ) -> Result<(), PolicyViolation> {
        let limit = Self::limit(ctx.terms)?;
        if state.counter(&ctx.key()) >= limit {
            return Err(PolicyViolation::CallLimitReached { limit });
        }
        Ok(())
    }

    fn after_execution(&self, ctx: &EnforcementContext<'_>, state: &mut CaveatState) {
        state.increment(ctx.key());
    }
}
