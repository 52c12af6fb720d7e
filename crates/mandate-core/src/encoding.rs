//! Canonical binary encoding
//!
//! Init code and threshold signature bundles use bincode's default
//! (fixed-int, little-endian) configuration. The encoding is deterministic
//! for the plain enums and vectors stored this way.

use crate::errors::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Serialize a value to its canonical bytes
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Deserialize a value from canonical bytes
pub fn from_canonical_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}
