// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{fundraiser_address, load_wallet, write_factory};
use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use cloak_client::{format::format_datetime, validation::parse_end_time};
use cloak_config::AppConfig;
use cloak_contracts::FundraiserWrite;

pub async fn execute(
    config: &AppConfig,
    name: String,
    target: u64,
    end_time: String,
    address: Option<Address>,
) -> Result<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        bail!("Argument --name must not be empty");
    }
    if target == 0 {
        bail!("Argument --target must be greater than zero");
    }
    let end_time = parse_end_time(&end_time)
        .with_context(|| format!("Argument --end-time '{}' is not a valid time", end_time))?;

    let address = fundraiser_address(config, address)?;
    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;

    let pending = factory
        .fundraiser(address)
        .update_campaign(name.clone(), target, end_time)
        .await?;
    println!("Wait for tx:{}...", pending.hash());
    let confirmed = pending.confirmed().await?;
    println!(
        "Campaign '{}' now targets {} until {} (tx:{})",
        name,
        target,
        format_datetime(end_time),
        confirmed.hash
    );

    Ok(())
}
