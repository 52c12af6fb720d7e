//! Account addresses, delegation hashes and method selectors

use crate::errors::{MandateError, Result};
use crate::hash;
use ed25519_dalek::VerifyingKey;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 20-byte account identifier.
///
/// Externally owned accounts derive their address from an Ed25519 verifying
/// key; contract accounts receive theirs from deterministic deployment.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Length of an address in bytes
    pub const LEN: usize = 20;

    /// The all-zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Sentinel delegate meaning "whoever redeems".
    pub const ANY: Address = Address([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x0a, 0x11,
    ]);

    /// Wrap raw address bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, which must be exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; 20] = bytes.try_into().map_err(|_| {
            MandateError::invalid(format!(
                "Invalid address length: expected 20 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    /// Derive an address from an arbitrary 32-byte digest (last 20 bytes).
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&digest[12..]);
        Self(raw)
    }

    /// Derive the address controlled by an Ed25519 key
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self::from_digest(&hash::hash(key.as_bytes()))
    }

    /// Deterministic address for a named well-known component (enforcers, factories).
    pub fn well_known(name: &str) -> Self {
        Self::from_digest(&hash::hash_tagged("mandate.well-known", name.as_bytes()))
    }

    /// Parse a hex address with optional `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(stripped)?)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns `true` for the all-zero address
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = MandateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// 32-byte content hash identifying a delegation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DelegationHash([u8; 32]);

impl DelegationHash {
    /// Sentinel marking a delegation granted from the delegator's own authority.
    pub const ROOT: DelegationHash = DelegationHash([0xff; 32]);

    /// Wrap raw hash bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string with optional `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        let raw: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            MandateError::invalid(format!(
                "Invalid delegation hash length: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex string without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns `true` for the root authority sentinel
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl fmt::Display for DelegationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for DelegationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "DelegationHash(ROOT)")
        } else {
            write!(f, "DelegationHash({}..)", &self.to_hex()[..16])
        }
    }
}

// Human-readable formats (JSON, TOML) carry `0x` hex strings; binary formats
// carry the raw fixed-size array.
macro_rules! impl_hex_serde {
    ($ty:ident, $len:expr) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    let stripped = s.strip_prefix("0x").unwrap_or(&s);
                    let bytes = hex::decode(stripped).map_err(D::Error::custom)?;
                    let raw: [u8; $len] = bytes.as_slice().try_into().map_err(|_| {
                        D::Error::custom(format!("expected {} bytes, got {}", $len, bytes.len()))
                    })?;
                    Ok(Self(raw))
                } else {
                    Ok(Self(<[u8; $len]>::deserialize(deserializer)?))
                }
            }
        }
    };
}

impl_hex_serde!(Address, 20);
impl_hex_serde!(DelegationHash, 32);
impl_hex_serde!(Selector, 4);

/// 4-byte method selector at the head of call data.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector([u8; 4]);

impl Selector {
    /// Length of a selector in bytes
    pub const LEN: usize = 4;

    /// Wrap raw selector bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Selector for a method signature such as `"increment()"`
    pub fn from_signature(signature: &str) -> Self {
        let digest = hash::hash(signature.as_bytes());
        Self([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Leading selector of `data`, if it is long enough
    pub fn from_call_data(data: &[u8]) -> Option<Self> {
        let head: [u8; 4] = data.get(..Self::LEN)?.try_into().ok()?;
        Some(Self(head))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}
