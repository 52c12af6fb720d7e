//! Restricts which methods an action may invoke

use super::{decode_fixed, CaveatEnforcer, EnforcementContext};
use crate::caveat::Caveat;
use crate::errors::PolicyViolation;
use crate::state::CaveatState;
use mandate_core::{Address, Selector};

/// Terms: one or more concatenated 4-byte selectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedMethodsEnforcer;

impl AllowedMethodsEnforcer {
    /// Well-known registry address
    pub fn address() -> Address {
        Address::well_known("enforcer.allowed-methods")
    }

    /// Encode terms permitting `selectors`
    pub fn terms(selectors: &[Selector]) -> Vec<u8> {
        selectors.iter().flat_map(|s| s.as_bytes().to_vec()).collect()
    }

    /// Caveat permitting only `selectors`
    pub fn caveat(selectors: &[Selector]) -> Caveat {
        Caveat::new(Self::address(), Self::terms(selectors))
    }
}

impl CaveatEnforcer for AllowedMethodsEnforcer {
    fn name(&self) -> &'static str {
        "allowed-methods"
    }

    fn enforce(
        &self,
        ctx: &EnforcementContext<'_>,
        _state: &CaveatState,
    ) -> Result<(), PolicyViolation> {
        let allowed = decode_fixed::<{ Selector::LEN }>(ctx.terms, "allowed-methods")?;
        let selector = ctx
            .action
            .selector()
            .ok_or(PolicyViolation::MissingSelector {
                length: ctx.action.data.len(),
            })?;
        if allowed.iter().any(|entry| entry == selector.as_bytes()) {
            Ok(())
        } else {
            Err(PolicyViolation::MethodNotAllowed { selector })
        }
    }
}
