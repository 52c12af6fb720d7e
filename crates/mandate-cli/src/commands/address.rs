//! Counterfactual address computation

use anyhow::{anyhow, Context, Result};
use clap::Args;
use mandate_account::Factory;
use mandate_core::Address;

/// Arguments for `mandate address`
#[derive(Args)]
pub struct AddressArgs {
    /// Factory address (hex, optional 0x prefix)
    #[arg(long)]
    pub factory: String,

    /// Deployment salt
    #[arg(long)]
    pub salt: u64,

    /// Hash of the init code (32 bytes hex)
    #[arg(long)]
    pub init_code_hash: String,
}

/// Compute the address `init_code_hash` deploys to
pub fn run(args: &AddressArgs) -> Result<Address> {
    let factory: Address = args.factory.parse().context("invalid factory address")?;
    let raw = hex::decode(args.init_code_hash.trim_start_matches("0x"))
        .context("init code hash is not hex")?;
    let init_code_hash: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("init code hash must be 32 bytes, got {}", raw.len()))?;

    Ok(Factory::compute_address(args.salt, &init_code_hash, factory))
}
