//! Delegation document hashing

use anyhow::{Context, Result};
use clap::Args;
use mandate_delegation::{Delegation, EngineConfig};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Arguments for `mandate hash`
#[derive(Args)]
pub struct HashArgs {
    /// Path to a delegation JSON document
    pub path: PathBuf,
}

/// Hash and signing payload of the delegation at `args.path`
pub fn run(args: &HashArgs, config: &EngineConfig) -> Result<String> {
    let content = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let delegation: Delegation = serde_json::from_str(&content)
        .with_context(|| format!("parsing delegation {}", args.path.display()))?;
    describe(&delegation, config)
}

fn describe(delegation: &Delegation, config: &EngineConfig) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "hash:     {}", delegation.hash())?;
    writeln!(
        out,
        "payload:  0x{}",
        hex::encode(delegation.signing_payload(&config.domain))
    )?;
    writeln!(out, "root:     {}", delegation.is_root())?;
    writeln!(out, "caveats:  {}", delegation.caveats.len())?;
    writeln!(out, "signed:   {}", !delegation.signature.is_empty())?;
    Ok(out)
}
