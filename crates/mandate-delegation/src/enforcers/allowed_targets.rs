//! Restricts which accounts an action may call

use super::{decode_fixed, CaveatEnforcer, EnforcementContext};
use crate::caveat::Caveat;
use crate::errors::PolicyViolation;
use crate::state::CaveatState;
use mandate_core::Address;

/// Terms: one or more concatenated 20-byte addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedTargetsEnforcer;

impl AllowedTargetsEnforcer {
    /// Well-known registry address
    pub fn address() -> Address {
        Address::well_known("enforcer.allowed-targets")
    }

    /// Encode terms permitting `targets`
    pub fn terms(targets: &[Address]) -> Vec<u8> {
        targets.iter().flat_map(|t| t.as_bytes().to_vec()).collect()
    }

    /// Caveat permitting only `targets`
    pub fn caveat(targets: &[Address]) -> Caveat {
        Caveat::new(Self::address(), Self::terms(targets))
    }
}

impl CaveatEnforcer for AllowedTargetsEnforcer {
    fn name(&self) -> &'static str {
        "allowed-targets"
    }

    fn enforce(
        &self,
        ctx: &EnforcementContext<'_>,
        _state: &CaveatState,
    ) -> Result<(), PolicyViolation> {
        let allowed = decode_fixed::<{ Address::LEN }>(ctx.terms, "allowed-targets")?;
        let target = ctx.action.target;
        if allowed.iter().any(|entry| entry == target.as_bytes()) {
            Ok(())
        } else {
            Err(PolicyViolation::TargetNotAllowed { target })
        }
    }
}
