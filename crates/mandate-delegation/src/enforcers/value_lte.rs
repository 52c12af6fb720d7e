//! Caps the native value an action may transfer

use super::{CaveatEnforcer, EnforcementContext};
use crate::caveat::Caveat;
use crate::errors::PolicyViolation;
use crate::state::CaveatState;
use mandate_core::Address;

/// Terms: a 16-byte big-endian maximum value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueLteEnforcer;

impl ValueLteEnforcer {
    /// Well-known registry address
    pub fn address() -> Address {
        Address::well_known("enforcer.value-lte")
    }

    /// Encode terms permitting at most `max`
    pub fn terms(max: u128) -> Vec<u8> {
        max.to_be_bytes().to_vec()
    }

    /// Caveat permitting at most `max`
    pub fn caveat(max: u128) -> Caveat {
        Caveat::new(Self::address(), Self::terms(max))
    }
}

impl CaveatEnforcer for ValueLteEnforcer {
    fn name(&self) -> &'static str {
        "value-lte"
    }

    fn enforce(
        &self,
        ctx: &EnforcementContext<'_>,
        _state: &CaveatState,
    ) -> Result<(), PolicyViolation> {
        let raw: [u8; 16] = ctx.terms.try_into().map_err(|_| {
            PolicyViolation::malformed_terms(format!(
                "value-lte terms must be 16 bytes, got {}",
                ctx.terms.len()
            ))
        })?;
        let max = u128::from_be_bytes(raw);
        if ctx.action.value > max {
            return Err(PolicyViolation::ValueExceeded {
                value: ctx.action.value,
                max,
            });
        }
        Ok(())
    }
}
