// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{load_wallet, token_address, write_factory};
use alloy::primitives::Address;
use anyhow::{bail, Result};
use cloak_config::AppConfig;
use cloak_contracts::TokenWrite;

pub async fn execute(
    config: &AppConfig,
    amount: u64,
    to: Option<Address>,
    token: Option<Address>,
) -> Result<()> {
    if amount == 0 {
        bail!("Argument --amount must be greater than zero");
    }

    let token = token_address(config, token)?;
    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;
    let to = to.unwrap_or(factory.sender());

    let pending = factory.token(token).mint(to, amount).await?;
    println!("Wait for tx:{}...", pending.hash());
    let confirmed = pending.confirmed().await?;
    println!("Minted {} to {} in tx:{}", amount, to, confirmed.hash);

    Ok(())
}
