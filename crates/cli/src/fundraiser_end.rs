// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{fundraiser_address, load_wallet, write_factory};
use alloy::primitives::Address;
use anyhow::Result;
use cloak_config::AppConfig;
use cloak_contracts::FundraiserWrite;

pub async fn execute(config: &AppConfig, address: Option<Address>) -> Result<()> {
    let address = fundraiser_address(config, address)?;
    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;

    let pending = factory.fundraiser(address).end_fundraising().await?;
    println!("Wait for tx:{}...", pending.hash());
    let confirmed = pending.confirmed().await?;
    println!("Campaign ended and funds withdrawn in tx:{}", confirmed.hash);

    Ok(())
}
